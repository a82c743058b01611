//! Configurable value types that can load from environment variables or plain values

use serde::{Deserialize, Serialize};
use smartquote_types::SecretString;
use std::fmt;

/// A configurable value that can be loaded from environment variables or used as plain text
///
/// Accepts either the table form `{ type = "env", value = "ACME_API_KEY" }` or
/// the short string form `"env:ACME_API_KEY"` / `"literal"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "ConfigurableValueRepr")]
pub struct ConfigurableValue {
	/// Type of value: "env" for environment variable, "plain" for direct value
	#[serde(rename = "type")]
	pub value_type: ValueType,
	/// The value: either environment variable name or the actual value
	pub value: String,
}

/// Type of configurable value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	/// Load value from environment variable (name specified in `value` field)
	Env,
	/// Use the value directly from the `value` field
	Plain,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigurableValueRepr {
	Short(String),
	Table {
		#[serde(rename = "type")]
		value_type: ValueType,
		value: String,
	},
}

impl From<ConfigurableValueRepr> for ConfigurableValue {
	fn from(repr: ConfigurableValueRepr) -> Self {
		match repr {
			ConfigurableValueRepr::Short(value) => ConfigurableValue::from(value),
			ConfigurableValueRepr::Table { value_type, value } => Self { value_type, value },
		}
	}
}

impl ConfigurableValue {
	/// Create a new environment variable reference
	pub fn from_env(env_var_name: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: env_var_name.to_string(),
		}
	}

	/// Create a new plain value
	pub fn from_plain(plain_value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: plain_value.to_string(),
		}
	}

	/// Resolve the actual value based on the type
	pub fn resolve(&self) -> Result<String, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value).map_err(|_| {
				ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())
			}),
			ValueType::Plain => Ok(self.value.clone()),
		}
	}

	/// Resolve straight into a zeroizing secret
	pub fn resolve_for_secret(&self) -> Result<SecretString, ConfigurableValueError> {
		let resolved_value = self.resolve()?;
		if resolved_value.trim().is_empty() {
			return Err(ConfigurableValueError::Empty(self.to_string()));
		}
		Ok(SecretString::new(resolved_value))
	}

	/// Plain secrets sit in config files; env references are preferred
	pub fn is_plain(&self) -> bool {
		matches!(self.value_type, ValueType::Plain)
	}

	/// Get a description of this configurable value for logging
	pub fn description(&self) -> String {
		match self.value_type {
			ValueType::Env => format!("environment variable '{}'", self.value),
			ValueType::Plain => "configured plain value".to_string(),
		}
	}
}

/// Errors that can occur when resolving configurable values
#[derive(Debug, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),

	#[error("Configured value {0} is empty")]
	Empty(String),
}

// Never print plain values
impl fmt::Display for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value_type {
			ValueType::Env => write!(f, "env:{}", self.value),
			ValueType::Plain => write!(f, "plain:[REDACTED]"),
		}
	}
}

impl From<&str> for ConfigurableValue {
	fn from(value: &str) -> Self {
		if let Some(env_var) = value.strip_prefix("env:") {
			Self::from_env(env_var)
		} else {
			Self::from_plain(value)
		}
	}
}

impl From<String> for ConfigurableValue {
	fn from(value: String) -> Self {
		ConfigurableValue::from(value.as_str())
	}
}
