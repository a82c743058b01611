//! SmartQuote Engine Library
//!
//! Multi-carrier insurance quote aggregation: fans an applicant's intake out
//! to every eligible carrier, scores the returned quotes and recommends one.

use smartquote_config::{ConfigLoadError, ConfigValidationError, LogFormat};
use smartquote_service::EngineError;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

// Core domain types
pub use smartquote_types::{
	chrono,
	rust_decimal,
	serde_json,
	AiExtraction,
	BusinessPolicy,
	CarrierAdapter,
	CarrierDescriptor,
	CarrierFailure,
	CarrierQuote,
	FailureKind,
	ProductLine,
	QuoteRequest,
	RawApplicantData,
	RiskProfile,
	RiskTier,
	ScoredQuote,
	SmartQuoteResult,
};

// Service layer
pub use smartquote_service::{
	CarrierGateway, CarrierGatewayTrait, EngineStage, QuoteScorer, RecommendationComposer,
	RiskExtractor, SmartQuoteEngine, SmartQuoteEngineTrait,
};

// API layer
pub use smartquote_api::{create_router, create_router_with, AppState};

// Adapters
pub use smartquote_adapters::{AdapterRegistry, OAuthRestAdapter, PartnerRestAdapter};

// Config
pub use smartquote_config::{
	load_config, log_service_info, log_service_shutdown, log_startup_complete, Settings,
};

pub mod types {
	pub use smartquote_types::*;
}

pub mod config {
	pub use smartquote_config::*;
}

pub mod adapters {
	pub use smartquote_adapters::*;
}

pub mod api {
	pub use smartquote_api::*;
}

pub mod service {
	pub use smartquote_service::*;
}

// Re-export for custom adapters
pub use async_trait;

#[derive(Debug, Error)]
pub enum EngineBuildError {
	#[error("Adapter registration failed: {0}")]
	Adapter(#[from] smartquote_types::AdapterFactoryError),

	#[error("Configuration error: {0}")]
	Config(#[from] ConfigValidationError),

	#[error("Configuration could not be loaded: {0}")]
	ConfigLoad(#[from] ConfigLoadError),

	#[error(transparent)]
	Engine(#[from] EngineError),

	#[error("Invalid bind address '{address}': {reason}")]
	InvalidBindAddress { address: String, reason: String },

	#[error("Tracing setup failed: {0}")]
	Tracing(String),

	#[error("Server error: {0}")]
	Io(#[from] std::io::Error),
}

/// Builder for wiring settings, adapters and carriers into a running engine
#[derive(Default)]
pub struct EngineBuilder {
	settings: Option<Settings>,
	adapter_registry: Option<AdapterRegistry>,
	carriers: Vec<CarrierDescriptor>,
	registration_error: Option<EngineBuildError>,
}

impl EngineBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder from already-loaded settings
	pub fn from_config(settings: Settings) -> Self {
		Self::new().with_settings(settings)
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Register a custom adapter next to the shipped ones
	///
	/// A duplicate adapter id is reported by [`start`](Self::start).
	pub fn with_adapter(mut self, adapter: Arc<dyn CarrierAdapter>) -> Self {
		let mut registry = self
			.adapter_registry
			.take()
			.unwrap_or_else(AdapterRegistry::with_defaults);
		if let Err(e) = registry.register(adapter) {
			if self.registration_error.is_none() {
				self.registration_error = Some(e.into());
			}
		}
		self.adapter_registry = Some(registry);
		self
	}

	/// Add a carrier on top of those in the settings
	pub fn with_carrier(mut self, descriptor: CarrierDescriptor) -> Self {
		self.carriers.push(descriptor);
		self
	}

	/// Build the engine without an HTTP surface
	pub fn build_engine(self) -> Result<SmartQuoteEngine, EngineBuildError> {
		if let Some(error) = self.registration_error {
			return Err(error);
		}

		let settings = self.settings.unwrap_or_default();
		settings.validate()?;

		let mut descriptors = settings.carrier_descriptors()?;
		descriptors.extend(self.carriers);

		let adapter_registry = Arc::new(
			self.adapter_registry
				.unwrap_or_else(AdapterRegistry::with_defaults),
		);

		let engine = SmartQuoteEngine::from_parts(&settings, descriptors, adapter_registry)?;
		let enabled = engine.carriers().iter().filter(|c| c.enabled).count();
		if enabled == 0 {
			warn!("No enabled carriers; every request will fail");
		}
		info!("Successfully initialized with {} enabled carrier(s)", enabled);

		Ok(engine)
	}

	/// Build the engine and return the configured router with state
	pub fn start(self) -> Result<(axum::Router, AppState), EngineBuildError> {
		let server = self
			.settings
			.as_ref()
			.map(|s| s.server.clone())
			.unwrap_or_default();
		let engine = self.build_engine()?;

		let app_state = AppState::new(Arc::new(engine));
		let router = create_router_with(&server).with_state(app_state.clone());

		Ok((router, app_state))
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(settings: &Settings) -> Result<(), EngineBuildError> {
		// RUST_LOG wins over the configured level
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

		let result = match settings.logging.format {
			LogFormat::Json => tracing_subscriber::fmt()
				.json()
				.with_env_filter(env_filter)
				.with_target(true)
				.try_init(),
			LogFormat::Pretty => tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter)
				.try_init(),
			LogFormat::Compact => tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter)
				.try_init(),
		};
		result.map_err(|e| EngineBuildError::Tracing(e.to_string()))?;

		info!(
			"Logging configuration applied: level={}, format={:?}",
			settings.logging.level, settings.logging.format
		);
		Ok(())
	}

	/// Start the complete server
	///
	/// Loads `.env` and configuration (unless settings were provided),
	/// initializes tracing, binds and serves until Ctrl-C.
	pub async fn start_server(mut self) -> Result<(), EngineBuildError> {
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};

		Self::init_tracing_from_settings(&settings)?;
		log_service_info(&settings);
		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr =
			bind_addr
				.parse()
				.map_err(|e: std::net::AddrParseError| EngineBuildError::InvalidBindAddress {
					address: bind_addr.clone(),
					reason: e.to_string(),
				})?;

		self.settings = Some(settings);
		let (app, _) = self.start()?;

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		info!("API endpoints available:");
		info!("  GET  /health");
		info!("  GET  /ready");
		info!("  GET  /v1/carriers");
		info!("  POST /v1/smart-quotes");
		info!("  POST /v1/smart-quotes/ai");

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		log_service_shutdown();
		Ok(())
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
}
