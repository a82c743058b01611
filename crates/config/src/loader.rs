//! Configuration loading utilities

use crate::settings::ConfigValidationError;
use crate::Settings;
use config::{Config, ConfigError, Environment, File};
use thiserror::Error;

/// Default config file, without extension
pub const DEFAULT_CONFIG_PATH: &str = "config/config";

/// Prefix for environment overrides, e.g. `SMARTQUOTE__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "SMARTQUOTE";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to load configuration: {0}")]
	Load(#[from] ConfigError),

	#[error(transparent)]
	Validation(#[from] ConfigValidationError),
}

/// Load configuration from `CONFIG_PATH` (or `config/config`) plus env overrides
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
	load_config_from(&path)
}

/// Load configuration from a specific file path plus env overrides
///
/// The file is optional; a missing file yields the defaults.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	let s = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?;

	let settings: Settings = s.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}
