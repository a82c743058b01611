//! Engine builder wiring

mod mocks;

use mocks::TimingControlledCarrier;
use smartquote::config::{CarrierAuthSettings, CarrierSettings, ConfigurableValue};
use smartquote::{EngineBuildError, EngineBuilder, ProductLine, Settings, SmartQuoteEngineTrait};

fn carrier_settings(adapter_id: &str) -> CarrierSettings {
	CarrierSettings {
		carrier_id: None,
		adapter_id: adapter_id.to_string(),
		endpoint: "https://carrier.example".to_string(),
		timeout_ms: None,
		enabled: true,
		product_lines: vec![ProductLine::Auto],
		required_fields: vec![],
		close_rate_boost: 0.0,
		reliability: 1.0,
		headers: None,
		name: None,
		auth: None,
	}
}

#[test]
fn test_default_builder_has_no_carriers() {
	let engine = EngineBuilder::new().build_engine().unwrap();
	assert!(engine.carriers().is_empty());
}

#[test]
fn test_carriers_from_settings_get_default_timeout() {
	let mut settings = Settings::default();
	settings.timeouts.default_carrier_ms = 2_500;
	settings
		.carriers
		.insert("acme".to_string(), carrier_settings("partner-rest-v1"));

	let engine = EngineBuilder::from_config(settings).build_engine().unwrap();
	let carriers = engine.carriers();

	assert_eq!(carriers.len(), 1);
	assert_eq!(carriers[0].carrier_id, "acme");
	assert_eq!(carriers[0].timeout_ms, 2_500);
}

#[test]
fn test_unknown_adapter_is_rejected() {
	let mut settings = Settings::default();
	settings
		.carriers
		.insert("acme".to_string(), carrier_settings("soap-v0"));

	let error = EngineBuilder::from_config(settings).build_engine().unwrap_err();
	assert!(matches!(error, EngineBuildError::Engine(_)));
	assert!(error.to_string().contains("soap-v0"));
}

#[test]
fn test_missing_secret_is_rejected() {
	let mut carrier = carrier_settings("partner-rest-v1");
	carrier.auth = Some(CarrierAuthSettings::ApiKey {
		header: "X-Api-Key".to_string(),
		key: ConfigurableValue::from_env("SMARTQUOTE_BUILDER_TEST_UNSET_KEY"),
	});
	let mut settings = Settings::default();
	settings.carriers.insert("acme".to_string(), carrier);

	let error = EngineBuilder::from_config(settings).build_engine().unwrap_err();
	assert!(matches!(error, EngineBuildError::Config(_)));
}

#[test]
fn test_duplicate_adapter_registration_is_reported() {
	let carrier = TimingControlledCarrier::quoting("dup", 1000);
	let error = EngineBuilder::new()
		.with_adapter(carrier.clone().shared())
		.with_adapter(carrier.shared())
		.build_engine()
		.unwrap_err();
	assert!(matches!(error, EngineBuildError::Adapter(_)));
}

#[test]
fn test_duplicate_carrier_is_rejected() {
	let carrier = TimingControlledCarrier::quoting("twice", 1000);
	let error = EngineBuilder::new()
		.with_carrier(carrier.descriptor(1_000))
		.with_carrier(carrier.descriptor(1_000))
		.with_adapter(carrier.shared())
		.build_engine()
		.unwrap_err();
	assert!(error.to_string().contains("twice"));
}

#[test]
fn test_invalid_scoring_weights_fail_validation() {
	let mut settings = Settings::default();
	settings.scoring.profitability_weight = -1.0;

	let error = EngineBuilder::from_config(settings).build_engine().unwrap_err();
	assert!(matches!(error, EngineBuildError::Config(_)));
}

#[tokio::test]
async fn test_start_returns_router_and_state() {
	let carrier = TimingControlledCarrier::quoting("acme", 1000);
	let (_router, state) = EngineBuilder::new()
		.with_carrier(carrier.descriptor(1_000))
		.with_adapter(carrier.shared())
		.start()
		.unwrap();

	let health = state.engine.health().await;
	assert_eq!(health.get("acme"), Some(&true));
}
