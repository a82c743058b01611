//! Carrier integration gateway
//!
//! Fans one canonical request out to every eligible carrier concurrently and
//! partitions the outcomes into quotes and failures. Every requested carrier
//! ends up in exactly one of the two sequences.

use async_trait::async_trait;
use smartquote_adapters::AdapterRegistry;
use smartquote_types::{
	CarrierAdapter, CarrierDescriptor, CarrierFailure, CarrierOutcome, CarrierRuntimeConfig,
	CarrierValidationError, FailureKind, GatewayResult, QuoteRequest,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum GatewayError {
	#[error("Carrier '{carrier_id}' references unknown adapter '{adapter_id}'")]
	UnknownAdapter {
		carrier_id: String,
		adapter_id: String,
	},

	#[error("Carrier '{0}' is configured more than once")]
	DuplicateCarrier(String),

	#[error(transparent)]
	InvalidCarrier(#[from] CarrierValidationError),
}

/// Trait for dispatching a request to carriers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarrierGatewayTrait: Send + Sync {
	/// Quote `request` with each carrier in `eligible`
	///
	/// Never fails: carriers that cannot be dispatched, time out or error are
	/// reported in `failures`.
	async fn get_quotes(&self, request: Arc<QuoteRequest>, eligible: &[String]) -> GatewayResult;

	/// Enabled carrier ids, sorted
	fn default_carriers(&self) -> Vec<String>;

	/// All configured carrier descriptors, sorted by id
	fn carriers(&self) -> Vec<CarrierDescriptor>;

	/// Adapter health per carrier
	async fn health_check_all(&self) -> BTreeMap<String, bool>;
}

/// Dispatch plan for one carrier that passed the capability check
struct Dispatch {
	index: usize,
	adapter: Arc<dyn CarrierAdapter>,
	config: CarrierRuntimeConfig,
}

/// Gateway over a fixed set of carrier descriptors
#[derive(Debug, Clone)]
pub struct CarrierGateway {
	carriers: Arc<BTreeMap<String, CarrierDescriptor>>,
	adapter_registry: Arc<AdapterRegistry>,
}

impl CarrierGateway {
	/// Create a gateway; descriptors are validated and frozen here
	pub fn new(
		descriptors: Vec<CarrierDescriptor>,
		adapter_registry: Arc<AdapterRegistry>,
	) -> Result<Self, GatewayError> {
		let mut carriers = BTreeMap::new();
		for descriptor in descriptors {
			descriptor.validate()?;
			let carrier_id = descriptor.carrier_id.clone();
			if carriers.insert(carrier_id.clone(), descriptor).is_some() {
				return Err(GatewayError::DuplicateCarrier(carrier_id));
			}
		}

		Ok(Self {
			carriers: Arc::new(carriers),
			adapter_registry,
		})
	}

	/// Validate that all carriers have matching adapters
	pub fn validate_adapters(&self) -> Result<(), GatewayError> {
		for carrier in self.carriers.values() {
			if !self.adapter_registry.contains(&carrier.adapter_id) {
				return Err(GatewayError::UnknownAdapter {
					carrier_id: carrier.carrier_id.clone(),
					adapter_id: carrier.adapter_id.clone(),
				});
			}
		}
		Ok(())
	}

	/// Capability check for one carrier
	fn screen(
		&self,
		request: &QuoteRequest,
		carrier_id: &str,
	) -> Result<(Arc<dyn CarrierAdapter>, CarrierRuntimeConfig), CarrierFailure> {
		let descriptor = self.carriers.get(carrier_id).ok_or_else(|| {
			CarrierFailure::new(
				carrier_id,
				FailureKind::Ineligible,
				format!("carrier {} is not configured", carrier_id),
			)
		})?;

		if let Some(reason) = descriptor.ineligibility_reason(request) {
			return Err(CarrierFailure::new(carrier_id, FailureKind::Ineligible, reason));
		}

		let adapter = self.adapter_registry.get(&descriptor.adapter_id).ok_or_else(|| {
			CarrierFailure::new(
				carrier_id,
				FailureKind::Unavailable,
				format!("no adapter registered for '{}'", descriptor.adapter_id),
			)
		})?;

		Ok((adapter, CarrierRuntimeConfig::from(descriptor)))
	}

	async fn call_carrier(
		adapter: Arc<dyn CarrierAdapter>,
		request: Arc<QuoteRequest>,
		config: CarrierRuntimeConfig,
	) -> CarrierOutcome {
		let started = Instant::now();
		debug!(
			"Dispatching request {} to carrier {} via {}",
			request.request_id,
			config.carrier_id,
			adapter.id()
		);

		let deadline = Duration::from_millis(config.timeout_ms);
		match timeout(deadline, adapter.quote(&request, &config)).await {
			Ok(CarrierOutcome::Quoted(mut quote)) => {
				let elapsed_ms = started.elapsed().as_millis() as u64;
				quote.carrier_id = config.carrier_id.clone();
				info!(
					"Carrier {} quoted {} annual in {}ms",
					config.carrier_id,
					quote.premium.annual(),
					elapsed_ms
				);
				CarrierOutcome::Quoted(quote.with_response_time(elapsed_ms))
			},
			Ok(CarrierOutcome::Failed(mut failure)) => {
				failure.carrier_id = config.carrier_id.clone();
				warn!(
					"Carrier {} failed ({}): {}",
					config.carrier_id, failure.kind, failure.detail
				);
				CarrierOutcome::Failed(failure)
			},
			Err(_) => {
				warn!(
					"Carrier {} timed out after {}ms",
					config.carrier_id, config.timeout_ms
				);
				CarrierOutcome::Failed(CarrierFailure::timeout(
					config.carrier_id.clone(),
					config.timeout_ms,
				))
			},
		}
	}
}

#[async_trait]
impl CarrierGatewayTrait for CarrierGateway {
	async fn get_quotes(&self, request: Arc<QuoteRequest>, eligible: &[String]) -> GatewayResult {
		let mut seen = HashSet::new();
		let carrier_ids: Vec<&str> = eligible
			.iter()
			.map(String::as_str)
			.filter(|id| seen.insert(*id))
			.collect();

		info!(
			"Fetching quotes for request {} from {} carriers",
			request.request_id,
			carrier_ids.len()
		);

		let mut outcomes: Vec<CarrierOutcome> = Vec::with_capacity(carrier_ids.len());
		let mut dispatches = Vec::new();
		for (index, carrier_id) in carrier_ids.iter().enumerate() {
			match self.screen(&request, carrier_id) {
				Ok((adapter, config)) => {
					// Replaced when the task reports back; left as-is if it panics
					outcomes.push(CarrierOutcome::Failed(CarrierFailure::new(
						*carrier_id,
						FailureKind::Unavailable,
						"adapter task terminated before reporting",
					)));
					dispatches.push(Dispatch {
						index,
						adapter,
						config,
					});
				},
				Err(failure) => {
					debug!(
						"Carrier {} not dispatched: {}",
						carrier_id, failure.detail
					);
					outcomes.push(CarrierOutcome::Failed(failure));
				},
			}
		}

		// Dropping the set aborts every in-flight task
		let mut tasks = JoinSet::new();
		for dispatch in dispatches {
			let request = Arc::clone(&request);
			tasks.spawn(async move {
				let outcome = Self::call_carrier(dispatch.adapter, request, dispatch.config).await;
				(dispatch.index, outcome)
			});
		}

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((index, outcome)) => outcomes[index] = outcome,
				Err(e) => warn!("Carrier task failed to complete: {}", e),
			}
		}

		let mut result = GatewayResult::default();
		for outcome in outcomes {
			match outcome {
				CarrierOutcome::Quoted(quote) => result.quotes.push(quote),
				CarrierOutcome::Failed(failure) => result.failures.push(failure),
			}
		}

		info!(
			"Quote dispatch completed for request {}: {} quotes, {} failures",
			request.request_id,
			result.quotes.len(),
			result.failures.len()
		);

		result
	}

	fn default_carriers(&self) -> Vec<String> {
		self.carriers
			.values()
			.filter(|carrier| carrier.enabled)
			.map(|carrier| carrier.carrier_id.clone())
			.collect()
	}

	fn carriers(&self) -> Vec<CarrierDescriptor> {
		self.carriers.values().cloned().collect()
	}

	async fn health_check_all(&self) -> BTreeMap<String, bool> {
		// Unhealthy until a check reports back
		let mut health: BTreeMap<String, bool> = self
			.carriers
			.keys()
			.map(|carrier_id| (carrier_id.clone(), false))
			.collect();

		let mut tasks = JoinSet::new();
		for carrier in self.carriers.values() {
			let Some(adapter) = self.adapter_registry.get(&carrier.adapter_id) else {
				continue;
			};
			let config = CarrierRuntimeConfig::from(carrier);
			tasks.spawn(async move {
				let deadline = Duration::from_millis(config.timeout_ms);
				let healthy = matches!(
					timeout(deadline, adapter.health_check(&config)).await,
					Ok(Ok(true))
				);
				(config.carrier_id, healthy)
			});
		}

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((carrier_id, healthy)) => {
					health.insert(carrier_id, healthy);
				},
				Err(e) => warn!("Carrier health check failed to complete: {}", e),
			}
		}

		health
	}
}

/// Carrier ids grouped by failure kind, for logging
pub fn failures_by_kind(result: &GatewayResult) -> HashMap<FailureKind, Vec<&str>> {
	let mut grouped: HashMap<FailureKind, Vec<&str>> = HashMap::new();
	for failure in &result.failures {
		grouped
			.entry(failure.kind)
			.or_default()
			.push(failure.carrier_id.as_str());
	}
	grouped
}
