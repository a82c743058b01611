//! Error types for adapter operations

use thiserror::Error;

use crate::carriers::{FailureKind, PremiumError};

/// Validation errors for adapter metadata
#[derive(Error, Debug)]
pub enum AdapterValidationError {
	#[error("Invalid adapter ID: {adapter_id}")]
	InvalidAdapterId { adapter_id: String },

	#[error("Invalid version format: {version}")]
	InvalidVersion { version: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },
}

/// Adapter operation errors
///
/// These never leave the adapter boundary as errors: [`crate::CarrierAdapter::quote`]
/// folds them into a `CarrierFailure` through [`AdapterError::failure_kind`].
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("Adapter validation failed: {0}")]
	Validation(#[from] AdapterValidationError),

	#[error("HTTP request failed: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Timeout occurred after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("HTTP {status_code}: {reason}")]
	HttpStatusError { status_code: u16, reason: String },

	#[error("Carrier rejected the applicant: {code} - {message}")]
	Rejected { code: String, message: String },

	#[error("Carrier unavailable: {reason}")]
	Unavailable { reason: String },

	#[error("Authentication failed for carrier {carrier_id}: {reason}")]
	AuthenticationFailed { carrier_id: String, reason: String },

	#[error("Configuration error: {reason}")]
	ConfigError { reason: String },

	#[error("Invalid premium: {0}")]
	InvalidPremium(#[from] PremiumError),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl AdapterError {
	/// Extract HTTP status code from the error if available
	pub fn status_code(&self) -> Option<u16> {
		match self {
			AdapterError::HttpStatusError { status_code, .. } => Some(*status_code),
			AdapterError::HttpError(reqwest_error) => {
				reqwest_error.status().map(|status| status.as_u16())
			},
			_ => None,
		}
	}

	/// Create an HTTP failure error with the given status code and reason
	pub fn http_failure(status_code: u16, reason: impl Into<String>) -> Self {
		Self::HttpStatusError {
			status_code,
			reason: reason.into(),
		}
	}

	/// Create an HTTP failure error from response status with default reason
	pub fn from_http_failure(status_code: u16) -> Self {
		let reason = match status_code {
			400 => "Bad Request".to_string(),
			401 => "Unauthorized".to_string(),
			403 => "Forbidden".to_string(),
			404 => "Not Found".to_string(),
			408 => "Request Timeout".to_string(),
			422 => "Unprocessable Entity".to_string(),
			429 => "Too Many Requests".to_string(),
			500 => "Internal Server Error".to_string(),
			502 => "Bad Gateway".to_string(),
			503 => "Service Unavailable".to_string(),
			504 => "Gateway Timeout".to_string(),
			_ => format!("HTTP Error {}", status_code),
		};

		Self::HttpStatusError {
			status_code,
			reason,
		}
	}

	/// Canonical failure kind for this error
	pub fn failure_kind(&self) -> FailureKind {
		match self {
			AdapterError::Timeout { .. } => FailureKind::Timeout,
			AdapterError::AuthenticationFailed { .. } => FailureKind::Auth,
			AdapterError::Rejected { .. } => FailureKind::ValidationRejected,
			AdapterError::InvalidResponse { .. }
			| AdapterError::InvalidPremium(_)
			| AdapterError::Serialization(_) => FailureKind::MalformedResponse,
			AdapterError::HttpError(e) if e.is_timeout() => FailureKind::Timeout,
			AdapterError::HttpError(e) if e.is_decode() => FailureKind::MalformedResponse,
			AdapterError::HttpError(_) | AdapterError::HttpStatusError { .. } => {
				match self.status_code() {
					Some(401) | Some(403) => FailureKind::Auth,
					Some(400) | Some(422) => FailureKind::ValidationRejected,
					Some(408) | Some(504) => FailureKind::Timeout,
					_ => FailureKind::Unavailable,
				}
			},
			AdapterError::Unavailable { .. }
			| AdapterError::ConfigError { .. }
			| AdapterError::Validation(_) => FailureKind::Unavailable,
		}
	}
}

/// Registry-specific errors
#[derive(Error, Debug)]
pub enum AdapterFactoryError {
	#[error("Adapter already registered: {adapter_id}")]
	AlreadyRegistered { adapter_id: String },

	#[error("Adapter not registered: {adapter_id}")]
	NotRegistered { adapter_id: String },
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;

	#[test]
	fn test_adapter_error_status_code_extraction() {
		let error = AdapterError::HttpStatusError {
			status_code: 404,
			reason: "Not Found".to_string(),
		};
		assert_eq!(error.status_code(), Some(404));

		let error = AdapterError::from_http_failure(429);
		assert_eq!(error.status_code(), Some(429));

		let error = AdapterError::InvalidResponse {
			reason: "Bad response".to_string(),
		};
		assert_eq!(error.status_code(), None);
	}

	#[test]
	fn test_status_codes_map_to_failure_kinds() {
		let cases = [
			(401, FailureKind::Auth),
			(403, FailureKind::Auth),
			(400, FailureKind::ValidationRejected),
			(422, FailureKind::ValidationRejected),
			(504, FailureKind::Timeout),
			(500, FailureKind::Unavailable),
			(503, FailureKind::Unavailable),
			(429, FailureKind::Unavailable),
		];
		for (status, kind) in cases {
			assert_eq!(
				AdapterError::from_http_failure(status).failure_kind(),
				kind,
				"status {}",
				status
			);
		}
	}

	#[test]
	fn test_non_http_errors_map_to_failure_kinds() {
		assert_eq!(
			AdapterError::Timeout { timeout_ms: 10 }.failure_kind(),
			FailureKind::Timeout
		);
		assert_eq!(
			AdapterError::Rejected {
				code: "UW-12".to_string(),
				message: "prior claims".to_string()
			}
			.failure_kind(),
			FailureKind::ValidationRejected
		);
		assert_eq!(
			AdapterError::InvalidPremium(PremiumError::NonPositive {
				value: Decimal::ZERO
			})
			.failure_kind(),
			FailureKind::MalformedResponse
		);
		assert_eq!(
			AdapterError::AuthenticationFailed {
				carrier_id: "acme".to_string(),
				reason: "bad secret".to_string()
			}
			.failure_kind(),
			FailureKind::Auth
		);
	}

	#[test]
	fn test_http_failure_status_message_mapping() {
		let error = AdapterError::from_http_failure(503);
		assert!(error.to_string().contains("503"));
		assert!(error.to_string().contains("Service Unavailable"));
	}
}
