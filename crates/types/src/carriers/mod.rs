//! Carrier domain model
//!
//! A carrier is one insurance company reachable through an adapter. Its
//! [`CarrierDescriptor`] is loaded once at startup and only read afterwards.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::applicant::ProductLine;
use crate::models::SecretString;
use crate::quotes::QuoteRequest;

pub mod failure;
pub mod premium;
pub mod quote;

pub use failure::{CarrierFailure, CarrierOutcome, FailureKind};
pub use premium::{Premium, PremiumError};
pub use quote::{raw_response_digest, CarrierQuote};

/// Default per-carrier timeout
pub const DEFAULT_CARRIER_TIMEOUT_MS: u64 = 5_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CarrierValidationError {
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Invalid carrier ID: {carrier_id}")]
	InvalidCarrierId { carrier_id: String },

	#[error("Invalid timeout for carrier {carrier_id}: {timeout_ms}ms")]
	InvalidTimeout { carrier_id: String, timeout_ms: u64 },

	#[error("Carrier {carrier_id} declares no product lines")]
	NoProductLines { carrier_id: String },
}

/// Credentials an adapter uses to authenticate against a carrier
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierCredentials {
	/// Static key sent in a header on every call
	ApiKey { header: String, key: SecretString },
	/// OAuth2 client-credentials grant
	ClientCredentials {
		client_id: String,
		client_secret: SecretString,
		scope: Option<String>,
	},
}

/// Static description and capabilities of one carrier
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarrierDescriptor {
	pub carrier_id: String,
	pub name: Option<String>,
	/// Adapter used to talk to this carrier
	pub adapter_id: String,
	pub endpoint: String,
	pub timeout_ms: u64,
	pub enabled: bool,
	pub product_lines: Vec<ProductLine>,
	/// Canonical request fields the carrier cannot quote without
	pub required_fields: Vec<String>,
	/// Relative uplift for carriers with historically higher close rates
	pub close_rate_boost: f64,
	/// Operational reliability signal in 0.0..=1.0
	pub reliability: f64,
	#[serde(skip)]
	pub headers: Option<HashMap<String, String>>,
	#[serde(skip)]
	pub credentials: Option<CarrierCredentials>,
}

impl CarrierDescriptor {
	pub fn new(
		carrier_id: impl Into<String>,
		adapter_id: impl Into<String>,
		endpoint: impl Into<String>,
		product_lines: Vec<ProductLine>,
	) -> Self {
		Self {
			carrier_id: carrier_id.into(),
			name: None,
			adapter_id: adapter_id.into(),
			endpoint: endpoint.into(),
			timeout_ms: DEFAULT_CARRIER_TIMEOUT_MS,
			enabled: true,
			product_lines,
			required_fields: Vec::new(),
			close_rate_boost: 0.0,
			reliability: 1.0,
			headers: None,
			credentials: None,
		}
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}

	pub fn with_required_fields(mut self, fields: &[&str]) -> Self {
		self.required_fields = fields.iter().map(|f| f.to_string()).collect();
		self
	}

	pub fn with_close_rate_boost(mut self, boost: f64) -> Self {
		self.close_rate_boost = boost.max(0.0);
		self
	}

	pub fn with_reliability(mut self, reliability: f64) -> Self {
		self.reliability = reliability.clamp(0.0, 1.0);
		self
	}

	pub fn with_credentials(mut self, credentials: CarrierCredentials) -> Self {
		self.credentials = Some(credentials);
		self
	}

	pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
		self.headers = Some(headers);
		self
	}

	/// Check the request against this carrier's capabilities
	///
	/// Returns the reason the carrier cannot quote, if any.
	pub fn ineligibility_reason(&self, request: &QuoteRequest) -> Option<String> {
		if !self.enabled {
			return Some(format!("carrier {} is disabled", self.carrier_id));
		}

		if !self.product_lines.contains(&request.product_line) {
			return Some(format!(
				"carrier {} does not write {} policies",
				self.carrier_id, request.product_line
			));
		}

		let missing = request.missing_fields(&self.required_fields);
		if !missing.is_empty() {
			return Some(format!(
				"carrier {} requires missing fields: {}",
				self.carrier_id,
				missing.join(", ")
			));
		}

		None
	}

	pub fn validate(&self) -> Result<(), CarrierValidationError> {
		if self.carrier_id.is_empty() {
			return Err(CarrierValidationError::MissingRequiredField {
				field: "carrier_id".to_string(),
			});
		}

		if !self
			.carrier_id
			.chars()
			.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
		{
			return Err(CarrierValidationError::InvalidCarrierId {
				carrier_id: self.carrier_id.clone(),
			});
		}

		if self.adapter_id.is_empty() {
			return Err(CarrierValidationError::MissingRequiredField {
				field: "adapter_id".to_string(),
			});
		}

		if self.timeout_ms == 0 {
			return Err(CarrierValidationError::InvalidTimeout {
				carrier_id: self.carrier_id.clone(),
				timeout_ms: self.timeout_ms,
			});
		}

		if self.product_lines.is_empty() {
			return Err(CarrierValidationError::NoProductLines {
				carrier_id: self.carrier_id.clone(),
			});
		}

		Ok(())
	}
}

/// Minimal runtime configuration handed to adapters
///
/// Only what an adapter needs to make the call; capabilities and scoring
/// hints stay on the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierRuntimeConfig {
	pub carrier_id: String,
	pub endpoint: String,
	pub timeout_ms: u64,
	pub headers: Option<HashMap<String, String>>,
	pub credentials: Option<CarrierCredentials>,
}

impl CarrierRuntimeConfig {
	pub fn new(carrier_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
		Self {
			carrier_id: carrier_id.into(),
			endpoint: endpoint.into(),
			timeout_ms: DEFAULT_CARRIER_TIMEOUT_MS,
			headers: None,
			credentials: None,
		}
	}

	pub fn with_credentials(mut self, credentials: CarrierCredentials) -> Self {
		self.credentials = Some(credentials);
		self
	}
}

impl From<&CarrierDescriptor> for CarrierRuntimeConfig {
	fn from(descriptor: &CarrierDescriptor) -> Self {
		Self {
			carrier_id: descriptor.carrier_id.clone(),
			endpoint: descriptor.endpoint.clone(),
			timeout_ms: descriptor.timeout_ms,
			headers: descriptor.headers.clone(),
			credentials: descriptor.credentials.clone(),
		}
	}
}
