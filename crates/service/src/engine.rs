//! SmartQuote engine
//!
//! The single entry point: intake in, [`SmartQuoteResult`] out. Each request
//! moves through `Extracting → Dispatching → Scoring → Composing` and ends in
//! `Succeeded` or `Failed`.

use async_trait::async_trait;
use chrono::Utc;
use smartquote_adapters::AdapterRegistry;
use smartquote_config::{ConfigValidationError, Settings};
use smartquote_types::{
	AiExtraction, BusinessPolicy, CarrierDescriptor, RawApplicantData, SmartQuoteResult,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::composer::RecommendationComposer;
use crate::gateway::{failures_by_kind, CarrierGateway, CarrierGatewayTrait, GatewayError};
use crate::risk::{RiskExtractor, RiskExtractorTrait};
use crate::scoring::{QuoteScorer, QuoteScorerTrait};

/// Processing stage of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStage {
	Extracting,
	Dispatching,
	Scoring,
	Composing,
	Succeeded,
	Failed,
}

impl EngineStage {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Succeeded | Self::Failed)
	}
}

impl fmt::Display for EngineStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Extracting => "extracting",
			Self::Dispatching => "dispatching",
			Self::Scoring => "scoring",
			Self::Composing => "composing",
			Self::Succeeded => "succeeded",
			Self::Failed => "failed",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Invalid configuration: {0}")]
	Config(#[from] ConfigValidationError),

	#[error("Gateway setup failed: {0}")]
	Gateway(#[from] GatewayError),
}

/// Trait for the quote engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmartQuoteEngineTrait: Send + Sync {
	/// Produce a recommendation for form or chat intake
	async fn generate_smart_quote(&self, intake: RawApplicantData) -> SmartQuoteResult;

	/// Same as [`generate_smart_quote`](Self::generate_smart_quote) for an
	/// untrusted AI extraction
	async fn generate_from_ai(&self, extraction: AiExtraction) -> SmartQuoteResult;

	/// Configured carriers, sorted by id
	fn carriers(&self) -> Vec<CarrierDescriptor>;

	/// Adapter health per carrier
	async fn health(&self) -> BTreeMap<String, bool>;
}

/// Tracks and logs stage transitions for one request
struct StageTracker<'a> {
	request_id: &'a str,
	stage: EngineStage,
	started: Instant,
}

impl<'a> StageTracker<'a> {
	fn start(request_id: &'a str) -> Self {
		debug!("Request {} entering {}", request_id, EngineStage::Extracting);
		Self {
			request_id,
			stage: EngineStage::Extracting,
			started: Instant::now(),
		}
	}

	fn advance(&mut self, next: EngineStage) {
		debug!(
			"Request {}: {} -> {} after {}ms",
			self.request_id,
			self.stage,
			next,
			self.started.elapsed().as_millis()
		);
		self.stage = next;
	}

	fn finish(mut self, result: &SmartQuoteResult) -> EngineStage {
		let terminal = if result.success {
			EngineStage::Succeeded
		} else {
			EngineStage::Failed
		};
		self.advance(terminal);
		self.stage
	}
}

/// Orchestrates extraction, dispatch, scoring and composition
#[derive(Clone)]
pub struct SmartQuoteEngine {
	extractor: Arc<dyn RiskExtractorTrait>,
	gateway: Arc<dyn CarrierGatewayTrait>,
	scorer: Arc<dyn QuoteScorerTrait>,
	composer: RecommendationComposer,
	policy: BusinessPolicy,
}

impl fmt::Debug for SmartQuoteEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SmartQuoteEngine")
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}

impl SmartQuoteEngine {
	pub fn new(
		extractor: Arc<dyn RiskExtractorTrait>,
		gateway: Arc<dyn CarrierGatewayTrait>,
		scorer: Arc<dyn QuoteScorerTrait>,
		policy: BusinessPolicy,
	) -> Self {
		Self {
			extractor,
			gateway,
			scorer,
			composer: RecommendationComposer::new(),
			policy,
		}
	}

	/// Wire the default extractor, gateway and scorer from loaded settings
	pub fn from_settings(
		settings: &Settings,
		adapter_registry: Arc<AdapterRegistry>,
	) -> Result<Self, EngineError> {
		let descriptors = settings.carrier_descriptors()?;
		Self::from_parts(settings, descriptors, adapter_registry)
	}

	/// Like [`from_settings`](Self::from_settings) with an explicit carrier set
	pub fn from_parts(
		settings: &Settings,
		descriptors: Vec<CarrierDescriptor>,
		adapter_registry: Arc<AdapterRegistry>,
	) -> Result<Self, EngineError> {
		let scorer = QuoteScorer::new(settings.scoring.clone()).with_carriers(&descriptors);
		let gateway = CarrierGateway::new(descriptors, adapter_registry)?;
		gateway.validate_adapters()?;

		Ok(Self::new(
			Arc::new(RiskExtractor::new(settings.risk.clone())),
			Arc::new(gateway),
			Arc::new(scorer),
			settings.policy.clone(),
		))
	}

	pub fn policy(&self) -> &BusinessPolicy {
		&self.policy
	}

	async fn run(&self, mut intake: RawApplicantData) -> SmartQuoteResult {
		// Pin the reference date so extraction stays a pure function of intake
		if intake.effective_date.is_none() {
			intake.effective_date = Some(Utc::now().date_naive());
		}

		let request_id = Uuid::new_v4().to_string();
		let mut tracker = StageTracker::start(&request_id);

		let profile = self.extractor.extract(&intake);
		let mut request = match self.extractor.build_request(&intake) {
			Ok(request) => request,
			Err(e) => {
				warn!("Request {} rejected before dispatch: {}", request_id, e);
				let result = SmartQuoteResult::failed(
					request_id.as_str(),
					format!("Cannot build quote request: {}", e),
					Vec::new(),
				)
				.with_risk_profile(profile);
				tracker.finish(&result);
				return result;
			},
		};
		request.request_id = request_id.clone();

		if !profile.is_complete() {
			debug!(
				"Request {} continues with missing fields: {:?}",
				request_id,
				profile.missing_fields()
			);
		}

		tracker.advance(EngineStage::Dispatching);
		let eligible = self.gateway.default_carriers();
		info!(
			"Request {} ({}, risk {} {:.1}) dispatching to {} carriers",
			request_id,
			request.product_line,
			profile.tier(),
			profile.score(),
			eligible.len()
		);
		let gateway_result = self.gateway.get_quotes(Arc::new(request), &eligible).await;

		for (kind, carriers) in failures_by_kind(&gateway_result) {
			warn!(
				"Request {}: {} carrier(s) failed with {}: {}",
				request_id,
				carriers.len(),
				kind,
				carriers.join(", ")
			);
		}

		tracker.advance(EngineStage::Scoring);
		let scored = self.scorer.rank(&gateway_result.quotes, &profile);

		tracker.advance(EngineStage::Composing);
		let result = self
			.composer
			.compose(&request_id, scored, gateway_result.failures, &self.policy)
			.with_risk_profile(profile);

		let terminal = tracker.finish(&result);
		info!(
			"Request {} {}: {} quoted, {} failed, recommended {}",
			request_id,
			terminal,
			result.metrics.carriers_quoted,
			result.metrics.carriers_failed,
			result.recommended_carrier.as_deref().unwrap_or("none")
		);

		result
	}
}

#[async_trait]
impl SmartQuoteEngineTrait for SmartQuoteEngine {
	async fn generate_smart_quote(&self, intake: RawApplicantData) -> SmartQuoteResult {
		self.run(intake).await
	}

	async fn generate_from_ai(&self, extraction: AiExtraction) -> SmartQuoteResult {
		if extraction.has_enough_info {
			debug!("AI extraction claims enough info; checking fields independently");
		}
		self.run(RawApplicantData::from(extraction)).await
	}

	fn carriers(&self) -> Vec<CarrierDescriptor> {
		self.gateway.carriers()
	}

	async fn health(&self) -> BTreeMap<String, bool> {
		self.gateway.health_check_all().await
	}
}
