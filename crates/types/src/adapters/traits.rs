//! Core adapter trait for carrier integrations

use async_trait::async_trait;
use std::fmt::Debug;

use super::{Adapter, AdapterResult};
use crate::carriers::{CarrierFailure, CarrierOutcome, CarrierQuote, CarrierRuntimeConfig};
use crate::quotes::QuoteRequest;

/// Core trait for carrier adapter implementations
///
/// An adapter owns everything carrier-specific: auth scheme, request and
/// response schema, error codes. Nothing carrier-shaped crosses this trait.
#[async_trait]
pub trait CarrierAdapter: Send + Sync + Debug {
	/// Get adapter information
	fn adapter_info(&self) -> &Adapter;

	/// Get adapter ID (for registration and carrier matching)
	fn id(&self) -> &str {
		&self.adapter_info().adapter_id
	}

	/// Get human-readable name for this adapter
	fn name(&self) -> &str {
		&self.adapter_info().name
	}

	/// Request a quote from the carrier described by `config`
	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &CarrierRuntimeConfig,
	) -> AdapterResult<CarrierQuote>;

	/// Health check for the carrier using runtime configuration
	async fn health_check(&self, config: &CarrierRuntimeConfig) -> AdapterResult<bool>;

	/// Request a quote and fold any error into a [`CarrierFailure`]
	///
	/// This is the boundary the gateway calls; it never returns an error.
	async fn quote(&self, request: &QuoteRequest, config: &CarrierRuntimeConfig) -> CarrierOutcome {
		match self.get_quote(request, config).await {
			Ok(mut quote) => {
				quote.carrier_id = config.carrier_id.clone();
				CarrierOutcome::Quoted(quote)
			},
			Err(e) => CarrierOutcome::Failed(CarrierFailure::from_adapter_error(
				config.carrier_id.clone(),
				&e,
			)),
		}
	}
}
