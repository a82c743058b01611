//! Service startup logging for the SmartQuote engine

use crate::Settings;
use std::env;
use tracing::{info, warn};

/// Logs service and configuration information at startup
pub fn log_service_info(settings: &Settings) {
	let service_name = "smartquote";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== SmartQuote Engine Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level (RUST_LOG): {}", rust_log);
	} else {
		info!("🔧 Log Level: {}", settings.logging.level);
	}

	if let Ok(config_path) = env::var("CONFIG_PATH") {
		info!("📋 Config Path: {}", config_path);
	}

	let mut carrier_ids: Vec<&String> = settings.carriers.keys().collect();
	carrier_ids.sort();
	info!(
		"🏢 Carriers configured: {} ({})",
		carrier_ids.len(),
		carrier_ids
			.iter()
			.map(|id| id.as_str())
			.collect::<Vec<_>>()
			.join(", ")
	);
	if carrier_ids.is_empty() {
		warn!("No carriers configured; every quote request will fail");
	}

	info!(
		"📐 Policy: min margin score {}, max alternatives {}, carrier diversity {}",
		settings.policy.min_margin_score,
		settings.policy.max_alternatives,
		settings.policy.carrier_diversity
	);

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 SmartQuote Engine Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs additional startup completion information
pub fn log_startup_complete(bind_address: &str) {
	info!("✅ SmartQuote Engine Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Ready to accept quote requests");
}
