//! OAuth REST adapter
//!
//! For carriers behind an OAuth2 client-credentials grant. Access tokens are
//! cached per carrier and refreshed shortly before expiry; concurrent
//! requests for the same carrier share one refresh.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartquote_types::{
	Adapter, AdapterError, AdapterResult, CarrierAdapter, CarrierCredentials, CarrierQuote,
	CarrierRuntimeConfig, Premium, QuoteRequest, SecretString,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::{build_url, parse_body, read_body};

pub const OAUTH_REST_ADAPTER_ID: &str = "oauth-rest-v1";

/// Refresh tokens this many seconds before they expire
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Upper bound on a carrier-reported token lifetime (one day)
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: SecretString,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct AccessToken {
	token: SecretString,
	expires_at: DateTime<Utc>,
}

impl AccessToken {
	fn is_fresh(&self) -> bool {
		Utc::now() < self.expires_at - ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS)
	}
}

type TokenSlot = Arc<RwLock<Option<AccessToken>>>;

/// Expiry for a token issued at `issued_at`
///
/// Missing lifetimes use the default; reported ones are clamped to
/// `0..=MAX_TOKEN_LIFETIME_SECS` so a carrier cannot overflow the clock.
fn token_expiry(issued_at: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
	let lifetime = expires_in
		.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
		.clamp(0, MAX_TOKEN_LIFETIME_SECS);
	ChronoDuration::try_seconds(lifetime)
		.and_then(|d| issued_at.checked_add_signed(d))
		.unwrap_or(issued_at)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RateRequest {
	quote_reference: String,
	product: String,
	effective_date: String,
	applicant: serde_json::Value,
	risk_address: serde_json::Value,
	coverage: serde_json::Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	vehicle: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	property: Option<serde_json::Value>,
}

impl RateRequest {
	fn from_request(request: &QuoteRequest) -> AdapterResult<Self> {
		Ok(Self {
			quote_reference: request.request_id.clone(),
			product: request.product_line.as_str().to_uppercase(),
			effective_date: request.effective_date.format("%Y-%m-%d").to_string(),
			applicant: serde_json::to_value(&request.applicant)?,
			risk_address: serde_json::json!({
				"state": request.address.state_code(),
				"postalCode": request.address.zip_code,
				"city": request.address.city,
				"line1": request.address.street,
			}),
			coverage: serde_json::to_value(&request.coverage)?,
			vehicle: request
				.vehicle
				.as_ref()
				.map(serde_json::to_value)
				.transpose()?,
			property: request
				.property
				.as_ref()
				.map(serde_json::to_value)
				.transpose()?,
		})
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateResponse {
	rate: Rate,
	#[serde(default)]
	meta: Option<RateMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rate {
	/// Decimal string, e.g. "101.25"
	monthly_premium: String,
	#[serde(default)]
	commission: Option<String>,
	#[serde(default)]
	factors: Vec<RateFactor>,
}

#[derive(Debug, Deserialize)]
struct RateFactor {
	code: String,
	value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RateMeta {
	#[serde(default)]
	confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
	error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	code: String,
	message: String,
}

/// Adapter for carriers using OAuth2 client credentials
#[derive(Debug)]
pub struct OAuthRestAdapter {
	config: Adapter,
	cache: ClientCache,
	/// Access token per carrier
	tokens: Arc<DashMap<String, TokenSlot>>,
}

impl OAuthRestAdapter {
	pub fn new(config: Adapter) -> Self {
		Self::with_cache(config, ClientCache::new())
	}

	pub fn with_cache(config: Adapter, cache: ClientCache) -> Self {
		Self {
			config,
			cache,
			tokens: Arc::new(DashMap::new()),
		}
	}

	pub fn with_default_config() -> Self {
		Self::new(Adapter::new(
			OAUTH_REST_ADAPTER_ID.to_string(),
			"OAuth2 client-credentials rating API".to_string(),
			"OAuth REST Adapter".to_string(),
			"1.0.0".to_string(),
		))
	}

	fn token_slot(&self, carrier_id: &str) -> TokenSlot {
		self.tokens
			.entry(carrier_id.to_string())
			.or_default()
			.value()
			.clone()
	}

	/// Get a valid access token, refreshing it if needed
	///
	/// Readers take the shared lock; only one writer performs the refresh and
	/// the rest pick up its result on the re-check.
	async fn access_token(&self, config: &CarrierRuntimeConfig) -> AdapterResult<SecretString> {
		let slot = self.token_slot(&config.carrier_id);

		{
			let guard = slot.read().await;
			if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
				return Ok(token.token.clone());
			}
		}

		let mut guard = slot.write().await;
		if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
			return Ok(token.token.clone());
		}

		debug!(
			"Access token missing or expiring for carrier {}, requesting a new one",
			config.carrier_id
		);
		let fresh = self.fetch_token(config).await?;
		let token = fresh.token.clone();
		*guard = Some(fresh);
		Ok(token)
	}

	async fn invalidate_token(&self, carrier_id: &str) {
		if let Some(slot) = self.tokens.get(carrier_id).map(|s| s.value().clone()) {
			*slot.write().await = None;
		}
	}

	async fn fetch_token(&self, config: &CarrierRuntimeConfig) -> AdapterResult<AccessToken> {
		let auth_failure = |reason: String| AdapterError::AuthenticationFailed {
			carrier_id: config.carrier_id.clone(),
			reason,
		};

		let (client_id, client_secret, scope) = match &config.credentials {
			Some(CarrierCredentials::ClientCredentials {
				client_id,
				client_secret,
				scope,
			}) => (client_id, client_secret, scope),
			_ => return Err(auth_failure("No client credentials configured".to_string())),
		};

		let token_url = build_url(&config.endpoint, "oauth/token")
			.map_err(|e| auth_failure(format!("Invalid token endpoint: {}", e)))?;
		let client = self
			.cache
			.get_client(&ClientConfig::for_carrier(config, &self.config.adapter_id))?;

		let mut form = vec![
			("grant_type", "client_credentials"),
			("client_id", client_id.as_str()),
			("client_secret", client_secret.expose_secret()),
		];
		if let Some(scope) = scope {
			form.push(("scope", scope.as_str()));
		}

		let response = client
			.post(&token_url)
			.timeout(Duration::from_millis(config.timeout_ms))
			.form(&form)
			.send()
			.await
			.map_err(|e| auth_failure(format!("Token request failed: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(auth_failure(format!(
				"Token endpoint returned status {}",
				status
			)));
		}

		let body = read_body(response)
			.await
			.map_err(|e| auth_failure(format!("Token response could not be read: {}", e)))?;
		let token: TokenResponse = serde_json::from_str(&body)
			.map_err(|e| auth_failure(format!("Unreadable token response: {}", e)))?;

		if let Some(token_type) = &token.token_type {
			if !token_type.eq_ignore_ascii_case("bearer") {
				return Err(auth_failure(format!(
					"Unsupported token type: {}",
					token_type
				)));
			}
		}

		let expires_at = token_expiry(Utc::now(), token.expires_in);

		info!(
			"Obtained access token for carrier {} (expires: {})",
			config.carrier_id, expires_at
		);

		Ok(AccessToken {
			token: token.access_token,
			expires_at,
		})
	}

	fn into_quote(response: RateResponse, body: &str) -> AdapterResult<CarrierQuote> {
		let monthly = Decimal::from_str(response.rate.monthly_premium.trim()).map_err(|e| {
			AdapterError::InvalidResponse {
				reason: format!(
					"Invalid monthly premium '{}': {}",
					response.rate.monthly_premium, e
				),
			}
		})?;
		let premium = Premium::from_monthly(monthly)?;

		let commission = match response.rate.commission.as_deref() {
			Some(raw) => raw
				.trim()
				.parse::<f64>()
				.map_err(|e| AdapterError::InvalidResponse {
					reason: format!("Invalid commission '{}': {}", raw, e),
				})?,
			None => 0.0,
		};

		let mut quote = CarrierQuote::new("", premium, commission).with_raw_response(body);
		if let Some(confidence) = response.meta.and_then(|m| m.confidence) {
			quote = quote.with_confidence(confidence);
		}
		for factor in response.rate.factors {
			let value = match factor.value {
				serde_json::Value::String(s) => s,
				other => other.to_string(),
			};
			quote = quote.with_rating_factor(factor.code, value);
		}
		Ok(quote)
	}

	fn error_from_envelope(status: StatusCode, body: &str) -> AdapterError {
		match serde_json::from_str::<ErrorEnvelope>(body) {
			Ok(envelope) if status == StatusCode::BAD_REQUEST
				|| status == StatusCode::UNPROCESSABLE_ENTITY =>
			{
				AdapterError::Rejected {
					code: envelope.error.code,
					message: envelope.error.message,
				}
			},
			Ok(envelope) => AdapterError::http_failure(
				status.as_u16(),
				format!("{}: {}", envelope.error.code, envelope.error.message),
			),
			Err(_) => AdapterError::from_http_failure(status.as_u16()),
		}
	}
}

#[async_trait]
impl CarrierAdapter for OAuthRestAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &CarrierRuntimeConfig,
	) -> AdapterResult<CarrierQuote> {
		debug!(
			"Requesting {} rate from carrier {} via {}",
			request.product_line, config.carrier_id, self.config.adapter_id
		);

		let token = self.access_token(config).await?;
		let url = build_url(&config.endpoint, "v2/rates")?;
		let client = self
			.cache
			.get_client(&ClientConfig::for_carrier(config, &self.config.adapter_id))?;

		let response = client
			.post(&url)
			.bearer_auth(token.expose_secret())
			.timeout(Duration::from_millis(config.timeout_ms))
			.json(&RateRequest::from_request(request)?)
			.send()
			.await
			.map_err(AdapterError::HttpError)?;

		let status = response.status();
		let body = read_body(response).await?;

		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			warn!(
				"Carrier {} rejected access token with status {}, dropping cached token",
				config.carrier_id, status
			);
			self.invalidate_token(&config.carrier_id).await;
			return Err(AdapterError::AuthenticationFailed {
				carrier_id: config.carrier_id.clone(),
				reason: format!("Rate endpoint returned status {}", status),
			});
		}

		if !status.is_success() {
			return Err(Self::error_from_envelope(status, &body));
		}

		let parsed: RateResponse = parse_body(&body, "rate response")?;
		Self::into_quote(parsed, &body)
	}

	async fn health_check(&self, config: &CarrierRuntimeConfig) -> AdapterResult<bool> {
		match self.access_token(config).await {
			Ok(_) => Ok(true),
			Err(e) => {
				debug!("Health check failed for carrier {}: {}", config.carrier_id, e);
				Ok(false)
			},
		}
	}
}
