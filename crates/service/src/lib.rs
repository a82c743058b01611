//! SmartQuote Service
//!
//! Core logic for risk extraction, carrier dispatch, quote scoring and
//! recommendation composition.

pub mod composer;
pub mod engine;
pub mod gateway;
pub mod risk;
pub mod scoring;

pub use composer::{failure_summary, RecommendationComposer, NO_ELIGIBLE_CARRIERS};
pub use engine::{EngineError, EngineStage, SmartQuoteEngine, SmartQuoteEngineTrait};
pub use gateway::{failures_by_kind, CarrierGateway, CarrierGatewayTrait, GatewayError};
pub use risk::{factor_names, RiskExtractor, RiskExtractorTrait};
pub use scoring::{CarrierScoringProfile, QuoteScorer, QuoteScorerTrait};

