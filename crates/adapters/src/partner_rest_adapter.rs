//! Partner REST adapter
//!
//! Speaks the flat JSON rating API most partner carriers expose: a single
//! `POST {endpoint}/quotes` authenticated with a static API key header. The
//! carrier answers with a tagged body whose `status` is `quoted`, `declined`
//! or `error`, and prices in annual terms.

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartquote_types::{
	Adapter, AdapterError, AdapterResult, CarrierAdapter, CarrierCredentials, CarrierQuote,
	CarrierRuntimeConfig, Premium, QuoteRequest,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::{build_url, parse_body, read_body};

pub const PARTNER_REST_ADAPTER_ID: &str = "partner-rest-v1";

/// Commission assumed when the carrier does not report one
const DEFAULT_COMMISSION_RATE: f64 = 0.10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerQuoteRequest<'a> {
	reference: &'a str,
	line: &'a str,
	effective_date: String,
	insured: PartnerInsured<'a>,
	location: PartnerLocation<'a>,
	#[serde(skip_serializing_if = "Option::is_none")]
	limit: Option<Decimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	deductible: Option<Decimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	vehicle: Option<PartnerVehicle<'a>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	dwelling: Option<PartnerDwelling<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerInsured<'a> {
	first_name: Option<&'a str>,
	last_name: Option<&'a str>,
	email: Option<&'a str>,
	age: Option<u32>,
	credit_tier: Option<&'static str>,
	prior_claims: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerLocation<'a> {
	state: Option<String>,
	zip: Option<&'a str>,
	city: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerVehicle<'a> {
	year: Option<u16>,
	make: Option<&'a str>,
	model: Option<&'a str>,
	annual_mileage: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerDwelling<'a> {
	year_built: Option<u16>,
	square_feet: Option<u32>,
	construction: Option<&'a str>,
	value: Option<Decimal>,
}

impl<'a> From<&'a QuoteRequest> for PartnerQuoteRequest<'a> {
	fn from(request: &'a QuoteRequest) -> Self {
		Self {
			reference: &request.request_id,
			line: request.product_line.as_str(),
			effective_date: request.effective_date.format("%Y-%m-%d").to_string(),
			insured: PartnerInsured {
				first_name: request.applicant.first_name.as_deref(),
				last_name: request.applicant.last_name.as_deref(),
				email: request.applicant.email.as_deref(),
				age: request.applicant.age,
				credit_tier: request.applicant.credit_tier.as_ref().map(|tier| tier.as_str()),
				prior_claims: request.applicant.prior_claims,
			},
			location: PartnerLocation {
				state: request.address.state_code(),
				zip: request.address.zip_code.as_deref(),
				city: request.address.city.as_deref(),
			},
			limit: request.coverage.limit,
			deductible: request.coverage.deductible,
			vehicle: request.vehicle.as_ref().map(|v| PartnerVehicle {
				year: v.year,
				make: v.make.as_deref(),
				model: v.model.as_deref(),
				annual_mileage: v.annual_mileage,
			}),
			dwelling: request.property.as_ref().map(|p| PartnerDwelling {
				year_built: p.year_built,
				square_feet: p.square_feet,
				construction: p.construction.as_deref(),
				value: p.dwelling_value,
			}),
		}
	}
}

/// Carrier response body, discriminated by `status`
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum PartnerQuoteResponse {
	#[serde(rename_all = "camelCase")]
	Quoted {
		annual_premium: Decimal,
		#[serde(default)]
		commission_rate: Option<f64>,
		#[serde(default)]
		confidence: Option<f64>,
		#[serde(default)]
		rating_factors: BTreeMap<String, serde_json::Value>,
	},
	Declined {
		#[serde(default)]
		code: Option<String>,
		reason: String,
	},
	Error {
		message: String,
	},
}

/// Adapter for partner carriers using API-key REST rating
#[derive(Debug)]
pub struct PartnerRestAdapter {
	config: Adapter,
	cache: ClientCache,
}

impl PartnerRestAdapter {
	pub fn new(config: Adapter) -> Self {
		Self::with_cache(config, ClientCache::new())
	}

	pub fn with_cache(config: Adapter, cache: ClientCache) -> Self {
		Self { config, cache }
	}

	pub fn with_default_config() -> Self {
		Self::new(Adapter::new(
			PARTNER_REST_ADAPTER_ID.to_string(),
			"Partner REST rating API with API key auth".to_string(),
			"Partner REST Adapter".to_string(),
			"1.0.0".to_string(),
		))
	}

	fn api_key<'a>(config: &'a CarrierRuntimeConfig) -> AdapterResult<(&'a str, &'a str)> {
		match &config.credentials {
			Some(CarrierCredentials::ApiKey { header, key }) if !key.is_empty() => {
				Ok((header.as_str(), key.expose_secret()))
			},
			Some(CarrierCredentials::ApiKey { .. }) => Err(AdapterError::AuthenticationFailed {
				carrier_id: config.carrier_id.clone(),
				reason: "API key is empty".to_string(),
			}),
			Some(_) => Err(AdapterError::ConfigError {
				reason: format!(
					"Carrier {} is configured with non API key credentials",
					config.carrier_id
				),
			}),
			None => Err(AdapterError::AuthenticationFailed {
				carrier_id: config.carrier_id.clone(),
				reason: "No API key configured".to_string(),
			}),
		}
	}

	fn into_quote(response: PartnerQuoteResponse, body: &str) -> AdapterResult<CarrierQuote> {
		match response {
			PartnerQuoteResponse::Quoted {
				annual_premium,
				commission_rate,
				confidence,
				rating_factors,
			} => {
				let premium = Premium::from_annual(annual_premium)?;
				let mut quote =
					CarrierQuote::new("", premium, commission_rate.unwrap_or(DEFAULT_COMMISSION_RATE))
						.with_raw_response(body);
				if let Some(confidence) = confidence {
					quote = quote.with_confidence(confidence);
				}
				for (name, value) in rating_factors {
					let value = match value {
						serde_json::Value::String(s) => s,
						other => other.to_string(),
					};
					quote = quote.with_rating_factor(name, value);
				}
				Ok(quote)
			},
			PartnerQuoteResponse::Declined { code, reason } => Err(AdapterError::Rejected {
				code: code.unwrap_or_else(|| "DECLINED".to_string()),
				message: reason,
			}),
			PartnerQuoteResponse::Error { message } => {
				Err(AdapterError::Unavailable { reason: message })
			},
		}
	}
}

#[async_trait]
impl CarrierAdapter for PartnerRestAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &CarrierRuntimeConfig,
	) -> AdapterResult<CarrierQuote> {
		debug!(
			"Requesting {} quote from carrier {} via {}",
			request.product_line, config.carrier_id, self.config.adapter_id
		);

		let (key_header, key) = Self::api_key(config)?;
		let url = build_url(&config.endpoint, "quotes")?;
		let client = self
			.cache
			.get_client(&ClientConfig::for_carrier(config, &self.config.adapter_id))?;

		let response = client
			.post(&url)
			.header(key_header, key)
			.timeout(Duration::from_millis(config.timeout_ms))
			.json(&PartnerQuoteRequest::from(request))
			.send()
			.await
			.map_err(AdapterError::HttpError)?;

		let status = response.status();
		let body = read_body(response).await?;

		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			return Err(AdapterError::AuthenticationFailed {
				carrier_id: config.carrier_id.clone(),
				reason: format!("Carrier rejected API key with status {}", status),
			});
		}

		// Declines are reported in-band, sometimes with a 4xx status
		if !status.is_success() {
			if let Ok(response) = serde_json::from_str::<PartnerQuoteResponse>(&body) {
				return Self::into_quote(response, &body);
			}
			warn!(
				"Carrier {} quote endpoint returned status {}",
				config.carrier_id, status
			);
			return Err(AdapterError::from_http_failure(status.as_u16()));
		}

		let parsed: PartnerQuoteResponse = parse_body(&body, "partner quote response")?;
		Self::into_quote(parsed, &body)
	}

	async fn health_check(&self, config: &CarrierRuntimeConfig) -> AdapterResult<bool> {
		let url = build_url(&config.endpoint, "health")?;
		let client = self
			.cache
			.get_client(&ClientConfig::for_carrier(config, &self.config.adapter_id))?;

		match client
			.get(&url)
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
		{
			Ok(response) => Ok(response.status().is_success()),
			Err(e) => {
				debug!("Health check failed for carrier {}: {}", config.carrier_id, e);
				Ok(false)
			},
		}
	}
}
