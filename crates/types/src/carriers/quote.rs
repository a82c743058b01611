//! Canonical carrier quote

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::Premium;

/// One usable carrier response, normalized at the adapter boundary
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarrierQuote {
	pub quote_id: String,
	pub carrier_id: String,
	pub premium: Premium,
	/// Rating factors the carrier reported using, by name
	pub rating_factors: BTreeMap<String, String>,
	/// Commission paid to the marketplace, as a fraction of premium
	pub commission_rate: f64,
	/// Carrier-reported confidence or availability in 0.0..=1.0
	pub confidence: f64,
	pub response_time_ms: u64,
	/// SHA-256 digest of the raw carrier body. Audit-only, opaque to callers.
	pub raw_response_ref: Option<String>,
	pub received_at: DateTime<Utc>,
}

impl CarrierQuote {
	pub fn new(carrier_id: impl Into<String>, premium: Premium, commission_rate: f64) -> Self {
		Self {
			quote_id: Uuid::new_v4().to_string(),
			carrier_id: carrier_id.into(),
			premium,
			rating_factors: BTreeMap::new(),
			commission_rate: commission_rate.clamp(0.0, 1.0),
			confidence: 1.0,
			response_time_ms: 0,
			raw_response_ref: None,
			received_at: Utc::now(),
		}
	}

	pub fn with_confidence(mut self, confidence: f64) -> Self {
		self.confidence = confidence.clamp(0.0, 1.0);
		self
	}

	pub fn with_rating_factor(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.rating_factors.insert(name.into(), value.into());
		self
	}

	pub fn with_response_time(mut self, response_time_ms: u64) -> Self {
		self.response_time_ms = response_time_ms;
		self
	}

	/// Record an audit digest of the raw carrier body
	pub fn with_raw_response(mut self, body: &str) -> Self {
		self.raw_response_ref = Some(raw_response_digest(body));
		self
	}
}

/// Hex-encoded SHA-256 of a raw carrier body
pub fn raw_response_digest(body: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(body.as_bytes());
	hex::encode(hasher.finalize())
}
