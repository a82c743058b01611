//! Smart quote handlers
//!
//! Both endpoints answer 200 with a [`SmartQuoteResult`]; `success = false`
//! is a normal outcome, not an HTTP error.

use axum::{
	extract::{rejection::JsonRejection, State},
	response::Json,
};
use smartquote_types::{AiExtraction, RawApplicantData, SmartQuoteResult};
use tracing::info;

use crate::handlers::common::{bad_request, ApiError};
use crate::state::AppState;

/// POST /v1/smart-quotes - Quote form or chat intake
pub async fn post_smart_quote(
	State(state): State<AppState>,
	body: Result<Json<RawApplicantData>, JsonRejection>,
) -> Result<Json<SmartQuoteResult>, ApiError> {
	let Json(intake) = body.map_err(bad_request)?;
	info!(
		"Received smart quote request (product line: {})",
		intake
			.product_line
			.map(|p| p.to_string())
			.unwrap_or_else(|| "unknown".to_string())
	);

	let result = state.engine.generate_smart_quote(intake).await;
	log_outcome(&result);
	Ok(Json(result))
}

/// POST /v1/smart-quotes/ai - Quote a best-effort AI extraction
pub async fn post_smart_quote_ai(
	State(state): State<AppState>,
	body: Result<Json<AiExtraction>, JsonRejection>,
) -> Result<Json<SmartQuoteResult>, ApiError> {
	let Json(extraction) = body.map_err(bad_request)?;
	info!(
		"Received AI-extracted smart quote request (confidence: {:?}, claims enough info: {})",
		extraction.confidence, extraction.has_enough_info
	);

	let result = state.engine.generate_from_ai(extraction).await;
	log_outcome(&result);
	Ok(Json(result))
}

fn log_outcome(result: &SmartQuoteResult) {
	info!(
		"Returning smart quote {} (success: {}, {} quoted, {} failed)",
		result.request_id,
		result.success,
		result.metrics.carriers_quoted,
		result.metrics.carriers_failed
	);
}
