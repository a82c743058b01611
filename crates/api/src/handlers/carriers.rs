//! Carrier listing

use axum::{extract::State, response::Json};
use serde::Serialize;
use smartquote_types::{CarrierDescriptor, ProductLine};
use tracing::debug;

use crate::state::AppState;

/// Public view of a configured carrier; endpoints and credentials stay internal
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierResponse {
	pub carrier_id: String,
	pub name: Option<String>,
	pub adapter_id: String,
	pub enabled: bool,
	pub product_lines: Vec<ProductLine>,
	pub required_fields: Vec<String>,
	pub timeout_ms: u64,
}

impl From<CarrierDescriptor> for CarrierResponse {
	fn from(descriptor: CarrierDescriptor) -> Self {
		Self {
			carrier_id: descriptor.carrier_id,
			name: descriptor.name,
			adapter_id: descriptor.adapter_id,
			enabled: descriptor.enabled,
			product_lines: descriptor.product_lines,
			required_fields: descriptor.required_fields,
			timeout_ms: descriptor.timeout_ms,
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarriersResponse {
	pub carriers: Vec<CarrierResponse>,
	pub total: usize,
}

/// GET /v1/carriers - List configured carriers
pub async fn get_carriers(State(state): State<AppState>) -> Json<CarriersResponse> {
	let carriers: Vec<CarrierResponse> = state
		.engine
		.carriers()
		.into_iter()
		.map(CarrierResponse::from)
		.collect();
	debug!("Listing {} carriers", carriers.len());

	Json(CarriersResponse {
		total: carriers.len(),
		carriers,
	})
}
