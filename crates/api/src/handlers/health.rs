use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
	"OK"
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
	pub status: String,
	pub carriers: BTreeMap<String, bool>,
}

/// GET /ready - Readiness probe with per-carrier adapter checks
///
/// Degraded only when every carrier is unhealthy; partial outages still
/// produce quotes.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
	let carriers = state.engine.health().await;
	let any_healthy = carriers.is_empty() || carriers.values().any(|healthy| *healthy);

	let (code, status) = if any_healthy {
		(StatusCode::OK, "ready")
	} else {
		(StatusCode::SERVICE_UNAVAILABLE, "degraded")
	};

	(
		code,
		Json(ReadinessResponse {
			status: status.to_string(),
			carriers,
		}),
	)
}
