//! SmartQuote Types
//!
//! Shared models and traits for the SmartQuote engine.
//! This crate contains all domain models organized by business entity.

pub mod adapters;
pub mod applicant;
pub mod carriers;
pub mod models;
pub mod quotes;
pub mod results;
pub mod risk;

// Re-export chrono, rust_decimal and serde_json for convenience
pub use chrono;
pub use rust_decimal;
pub use serde_json;

pub use adapters::{
	Adapter, AdapterError, AdapterFactoryError, AdapterResult, AdapterValidationError,
	CarrierAdapter,
};

pub use applicant::{
	Address, AiExtraction, CoverageParams, CreditTier, IntakeSource, ProductLine, PropertyInfo,
	RawApplicantData, VehicleInfo,
};

pub use carriers::{
	CarrierCredentials, CarrierDescriptor, CarrierFailure, CarrierOutcome, CarrierQuote,
	CarrierRuntimeConfig, CarrierValidationError, FailureKind, Premium, PremiumError,
};

pub use models::SecretString;

pub use quotes::{Applicant, Coverage, QuoteRequest, QuoteValidationError, QuoteValidationResult};

pub use results::{
	AggregateMetrics, BusinessPolicy, GatewayResult, ScoredQuote, SmartQuoteResult,
};

pub use risk::{RiskFactor, RiskProfile, RiskTier};
