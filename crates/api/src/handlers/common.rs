use axum::{extract::rejection::JsonRejection, http::StatusCode, response::Json};
use serde::Serialize;

/// Error response format shared by handlers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
	pub fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
			timestamp: chrono::Utc::now().timestamp(),
		}
	}
}

/// Map a body that failed to extract, keeping the rejection status
/// (400 for bad JSON, 413 over the body limit, 415 for a wrong content type)
pub fn bad_request(rejection: JsonRejection) -> ApiError {
	(
		rejection.status(),
		Json(ErrorResponse::new("INVALID_BODY", rejection.body_text())),
	)
}
