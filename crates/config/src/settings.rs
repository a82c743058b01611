//! Configuration settings structures

use crate::{configurable_value::ConfigurableValue, ConfigurableValueError};
use serde::{Deserialize, Serialize};
use smartquote_types::carriers::DEFAULT_CARRIER_TIMEOUT_MS;
use smartquote_types::{
	BusinessPolicy, CarrierCredentials, CarrierDescriptor, CarrierValidationError, ProductLine,
};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub carriers: HashMap<String, CarrierSettings>,
	pub timeouts: TimeoutSettings,
	pub scoring: ScoringSettings,
	pub risk: RiskSettings,
	pub policy: BusinessPolicy,
	pub logging: LoggingSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
	/// Maximum accepted request body in bytes
	pub max_body_bytes: usize,
	/// Allowed CORS origins; empty allows any
	pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
			max_body_bytes: 64 * 1024,
			cors_origins: Vec::new(),
		}
	}
}

/// Individual carrier configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CarrierSettings {
	/// Defaults to the key of the carrier table
	#[serde(default)]
	pub carrier_id: Option<String>,
	pub adapter_id: String,
	pub endpoint: String,
	/// Falls back to `timeouts.default_carrier_ms`
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	pub product_lines: Vec<ProductLine>,
	#[serde(default)]
	pub required_fields: Vec<String>,
	#[serde(default)]
	pub close_rate_boost: f64,
	#[serde(default = "default_reliability")]
	pub reliability: f64,
	#[serde(default)]
	pub headers: Option<HashMap<String, String>>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub auth: Option<CarrierAuthSettings>,
}

fn default_enabled() -> bool {
	true
}

fn default_reliability() -> f64 {
	1.0
}

fn default_api_key_header() -> String {
	"X-Api-Key".to_string()
}

/// Carrier authentication as written in config files
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CarrierAuthSettings {
	ApiKey {
		#[serde(default = "default_api_key_header")]
		header: String,
		key: ConfigurableValue,
	},
	ClientCredentials {
		client_id: String,
		client_secret: ConfigurableValue,
		#[serde(default)]
		scope: Option<String>,
	},
}

impl CarrierAuthSettings {
	fn resolve(&self) -> Result<CarrierCredentials, ConfigurableValueError> {
		Ok(match self {
			Self::ApiKey { header, key } => CarrierCredentials::ApiKey {
				header: header.clone(),
				key: key.resolve_for_secret()?,
			},
			Self::ClientCredentials {
				client_id,
				client_secret,
				scope,
			} => CarrierCredentials::ClientCredentials {
				client_id: client_id.clone(),
				client_secret: client_secret.resolve_for_secret()?,
				scope: scope.clone(),
			},
		})
	}
}

impl CarrierSettings {
	/// Build the runtime descriptor, resolving secrets
	pub fn to_descriptor(
		&self,
		key: &str,
		default_timeout_ms: u64,
	) -> Result<CarrierDescriptor, ConfigValidationError> {
		let carrier_id = self.carrier_id.clone().unwrap_or_else(|| key.to_string());

		let credentials = self
			.auth
			.as_ref()
			.map(CarrierAuthSettings::resolve)
			.transpose()
			.map_err(|source| ConfigValidationError::Secret {
				carrier_id: carrier_id.clone(),
				source,
			})?;

		let mut descriptor = CarrierDescriptor::new(
			carrier_id,
			self.adapter_id.clone(),
			self.endpoint.clone(),
			self.product_lines.clone(),
		)
		.with_timeout_ms(self.timeout_ms.unwrap_or(default_timeout_ms))
		.with_close_rate_boost(self.close_rate_boost)
		.with_reliability(self.reliability);

		descriptor.name = self.name.clone();
		descriptor.enabled = self.enabled;
		descriptor.required_fields = self.required_fields.clone();
		descriptor.headers = self.headers.clone();
		descriptor.credentials = credentials;

		descriptor.validate()?;
		Ok(descriptor)
	}
}

/// Timeout configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutSettings {
	/// Per-carrier timeout when a carrier does not set its own
	pub default_carrier_ms: u64,
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self {
			default_carrier_ms: DEFAULT_CARRIER_TIMEOUT_MS,
		}
	}
}

/// Quote scoring weights and model parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringSettings {
	pub profitability_weight: f64,
	pub conversion_weight: f64,
	pub reliability_weight: f64,
	/// Expected claims cost as a share of premium at risk score 100
	pub claims_cost_ratio: f64,
	/// Conversion probability of a quote priced at the batch median
	pub base_conversion: f64,
	/// How quickly conversion falls as price rises above the median
	pub price_elasticity: f64,
	/// Multiplier applied to a carrier's `close_rate_boost`
	pub close_rate_weight: f64,
}

impl Default for ScoringSettings {
	fn default() -> Self {
		Self {
			profitability_weight: 0.4,
			conversion_weight: 0.4,
			reliability_weight: 0.2,
			claims_cost_ratio: 0.08,
			base_conversion: 0.5,
			price_elasticity: 2.0,
			close_rate_weight: 0.5,
		}
	}
}

/// Relative weights of the risk factors
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RiskWeights {
	pub age: f64,
	pub credit: f64,
	pub claims: f64,
	pub geography: f64,
	pub product: f64,
}

impl Default for RiskWeights {
	fn default() -> Self {
		Self {
			age: 0.25,
			credit: 0.2,
			claims: 0.25,
			geography: 0.15,
			product: 0.15,
		}
	}
}

impl RiskWeights {
	pub fn total(&self) -> f64 {
		self.age + self.credit + self.claims + self.geography + self.product
	}
}

/// Score thresholds between risk tiers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RiskBands {
	/// Scores below this are low risk
	pub low_max: f64,
	/// Scores below this (and at least `low_max`) are medium risk
	pub medium_max: f64,
}

impl Default for RiskBands {
	fn default() -> Self {
		Self {
			low_max: 35.0,
			medium_max: 65.0,
		}
	}
}

/// Risk extraction parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RiskSettings {
	pub weights: RiskWeights,
	pub bands: RiskBands,
	/// Geographic risk index per two-letter state code, 0.0 to 1.0
	pub state_index: BTreeMap<String, f64>,
	/// Index used for unknown or missing states
	pub default_state_index: f64,
}

impl Default for RiskSettings {
	fn default() -> Self {
		let state_index = [
			("CA", 0.70),
			("CO", 0.55),
			("FL", 0.85),
			("GA", 0.60),
			("IA", 0.30),
			("ID", 0.30),
			("IL", 0.55),
			("LA", 0.85),
			("MA", 0.45),
			("ME", 0.25),
			("MI", 0.75),
			("NC", 0.45),
			("NJ", 0.60),
			("NY", 0.65),
			("OH", 0.40),
			("OK", 0.70),
			("OR", 0.40),
			("PA", 0.50),
			("TX", 0.70),
			("VT", 0.25),
			("WA", 0.45),
			("WI", 0.35),
		]
		.into_iter()
		.map(|(state, index)| (state.to_string(), index))
		.collect();

		Self {
			weights: RiskWeights::default(),
			bands: RiskBands::default(),
			state_index,
			default_state_index: 0.5,
		}
	}
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Errors found while validating loaded settings
#[derive(Debug, Error)]
pub enum ConfigValidationError {
	#[error("Carrier {carrier_id} secret could not be resolved: {source}")]
	Secret {
		carrier_id: String,
		#[source]
		source: ConfigurableValueError,
	},

	#[error("Invalid carrier configuration: {0}")]
	Carrier(#[from] CarrierValidationError),

	#[error("Invalid {section} settings: {reason}")]
	Invalid { section: String, reason: String },
}

impl ConfigValidationError {
	fn invalid(section: &str, reason: impl Into<String>) -> Self {
		Self::Invalid {
			section: section.to_string(),
			reason: reason.into(),
		}
	}
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Carrier descriptors sorted by carrier id, secrets resolved
	///
	/// Disabled carriers are included; the gateway skips them by default.
	pub fn carrier_descriptors(&self) -> Result<Vec<CarrierDescriptor>, ConfigValidationError> {
		let mut descriptors = self
			.carriers
			.iter()
			.map(|(key, carrier)| carrier.to_descriptor(key, self.timeouts.default_carrier_ms))
			.collect::<Result<Vec<_>, _>>()?;
		descriptors.sort_by(|a, b| a.carrier_id.cmp(&b.carrier_id));
		Ok(descriptors)
	}

	/// Check numeric settings for consistency
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		let scoring = &self.scoring;
		let scoring_weights = [
			scoring.profitability_weight,
			scoring.conversion_weight,
			scoring.reliability_weight,
		];
		if scoring_weights.iter().any(|w| *w < 0.0) || scoring_weights.iter().sum::<f64>() <= 0.0 {
			return Err(ConfigValidationError::invalid(
				"scoring",
				"weights must be non-negative with a positive sum",
			));
		}
		if scoring.price_elasticity < 0.0 || !(0.0..=1.0).contains(&scoring.base_conversion) {
			return Err(ConfigValidationError::invalid(
				"scoring",
				"price_elasticity must be non-negative and base_conversion within 0..=1",
			));
		}

		let weights = &self.risk.weights;
		if [
			weights.age,
			weights.credit,
			weights.claims,
			weights.geography,
			weights.product,
		]
		.iter()
		.any(|w| *w < 0.0)
			|| weights.total() <= 0.0
		{
			return Err(ConfigValidationError::invalid(
				"risk",
				"weights must be non-negative with a positive sum",
			));
		}
		let bands = &self.risk.bands;
		if !(0.0..=100.0).contains(&bands.low_max)
			|| !(0.0..=100.0).contains(&bands.medium_max)
			|| bands.low_max >= bands.medium_max
		{
			return Err(ConfigValidationError::invalid(
				"risk",
				format!(
					"bands must satisfy 0 <= low_max < medium_max <= 100, got {} and {}",
					bands.low_max, bands.medium_max
				),
			));
		}

		if !(0.0..=100.0).contains(&self.policy.min_margin_score) {
			return Err(ConfigValidationError::invalid(
				"policy",
				"min_margin_score must be within 0..=100",
			));
		}

		if self.timeouts.default_carrier_ms == 0 {
			return Err(ConfigValidationError::invalid(
				"timeouts",
				"default_carrier_ms must be positive",
			));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn partner_carrier() -> CarrierSettings {
		CarrierSettings {
			carrier_id: None,
			adapter_id: "partner-rest-v1".to_string(),
			endpoint: "https://acme.example.com/api".to_string(),
			timeout_ms: None,
			enabled: true,
			product_lines: vec![ProductLine::Auto, ProductLine::Home],
			required_fields: vec!["state".to_string()],
			close_rate_boost: 0.2,
			reliability: 0.95,
			headers: None,
			name: Some("Acme Mutual".to_string()),
			auth: Some(CarrierAuthSettings::ApiKey {
				header: default_api_key_header(),
				key: ConfigurableValue::from_plain("acme-key"),
			}),
		}
	}

	#[test]
	fn test_default_settings_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.bind_address(), "0.0.0.0:3000");
		assert!(settings.carrier_descriptors().unwrap().is_empty());
	}

	#[test]
	fn test_carrier_descriptor_conversion() {
		let mut settings = Settings::default();
		settings.carriers.insert("acme".to_string(), partner_carrier());

		let descriptors = settings.carrier_descriptors().unwrap();
		assert_eq!(descriptors.len(), 1);

		let acme = &descriptors[0];
		assert_eq!(acme.carrier_id, "acme");
		assert_eq!(acme.timeout_ms, DEFAULT_CARRIER_TIMEOUT_MS);
		assert_eq!(acme.reliability, 0.95);
		assert!(matches!(
			acme.credentials,
			Some(CarrierCredentials::ApiKey { ref key, .. }) if key.expose_secret() == "acme-key"
		));
	}

	#[test]
	fn test_carrier_descriptors_sorted() {
		let mut settings = Settings::default();
		for key in ["zenith", "acme", "midland"] {
			settings.carriers.insert(key.to_string(), partner_carrier());
		}
		let ids: Vec<String> = settings
			.carrier_descriptors()
			.unwrap()
			.into_iter()
			.map(|d| d.carrier_id)
			.collect();
		assert_eq!(ids, vec!["acme", "midland", "zenith"]);
	}

	#[test]
	fn test_missing_secret_env_var() {
		let mut carrier = partner_carrier();
		carrier.auth = Some(CarrierAuthSettings::ClientCredentials {
			client_id: "smartquote".to_string(),
			client_secret: ConfigurableValue::from_env("SMARTQUOTE_TEST_UNSET_SECRET"),
			scope: None,
		});

		let err = carrier.to_descriptor("summit", 5000).unwrap_err();
		assert!(matches!(err, ConfigValidationError::Secret { ref carrier_id, .. } if carrier_id == "summit"));
	}

	#[test]
	fn test_invalid_bands_rejected() {
		let mut settings = Settings::default();
		settings.risk.bands = RiskBands {
			low_max: 70.0,
			medium_max: 60.0,
		};
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::Invalid { ref section, .. }) if section == "risk"
		));
	}

	#[test]
	fn test_carrier_settings_deserialize_with_tagged_auth() {
		let json = serde_json::json!({
			"adapter_id": "oauth-rest-v1",
			"endpoint": "https://summit.example.com",
			"product_lines": ["auto", "life"],
			"auth": {
				"type": "client_credentials",
				"client_id": "smartquote",
				"client_secret": "plain-secret"
			}
		});
		let carrier: CarrierSettings = serde_json::from_value(json).unwrap();
		assert!(carrier.enabled);
		assert_eq!(carrier.reliability, 1.0);
		assert!(matches!(
			carrier.auth,
			Some(CarrierAuthSettings::ClientCredentials { .. })
		));
	}
}
