//! Carrier failures and per-carrier outcomes

use serde::Serialize;
use std::fmt;

use super::CarrierQuote;
use crate::adapters::AdapterError;

/// Why a carrier did not produce a usable quote
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
	Timeout,
	Auth,
	ValidationRejected,
	Unavailable,
	MalformedResponse,
	/// Carrier cannot serve this request (product line or required fields)
	Ineligible,
}

impl FailureKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Timeout => "timeout",
			Self::Auth => "auth",
			Self::ValidationRejected => "validation-rejected",
			Self::Unavailable => "unavailable",
			Self::MalformedResponse => "malformed-response",
			Self::Ineligible => "ineligible",
		}
	}
}

impl fmt::Display for FailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A carrier that did not produce a usable quote
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CarrierFailure {
	pub carrier_id: String,
	pub kind: FailureKind,
	pub detail: String,
}

impl CarrierFailure {
	pub fn new(carrier_id: impl Into<String>, kind: FailureKind, detail: impl Into<String>) -> Self {
		Self {
			carrier_id: carrier_id.into(),
			kind,
			detail: detail.into(),
		}
	}

	pub fn timeout(carrier_id: impl Into<String>, timeout_ms: u64) -> Self {
		Self::new(
			carrier_id,
			FailureKind::Timeout,
			format!("No response within {}ms", timeout_ms),
		)
	}

	pub fn from_adapter_error(carrier_id: impl Into<String>, error: &AdapterError) -> Self {
		Self::new(carrier_id, error.failure_kind(), error.to_string())
	}
}

/// Terminal state of one carrier dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierOutcome {
	Quoted(CarrierQuote),
	Failed(CarrierFailure),
}

impl CarrierOutcome {
	pub fn carrier_id(&self) -> &str {
		match self {
			Self::Quoted(quote) => &quote.carrier_id,
			Self::Failed(failure) => &failure.carrier_id,
		}
	}

	pub fn is_quoted(&self) -> bool {
		matches!(self, Self::Quoted(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_failure_kind_wire_names() {
		let json = serde_json::to_string(&FailureKind::ValidationRejected).unwrap();
		assert_eq!(json, "\"validation-rejected\"");
		assert_eq!(FailureKind::MalformedResponse.to_string(), "malformed-response");
	}

	#[test]
	fn test_failure_from_adapter_error() {
		let error = AdapterError::http_failure(401, "Unauthorized");
		let failure = CarrierFailure::from_adapter_error("acme", &error);
		assert_eq!(failure.kind, FailureKind::Auth);
		assert!(failure.detail.contains("401"));
	}

	#[test]
	fn test_timeout_constructor() {
		let failure = CarrierFailure::timeout("slowpoke", 5000);
		assert_eq!(failure.kind, FailureKind::Timeout);
		assert_eq!(failure.carrier_id, "slowpoke");
		assert!(failure.detail.contains("5000ms"));
	}
}
