//! SmartQuote Adapters
//!
//! Carrier-specific adapters and the registry the gateway resolves them from.

pub mod client_cache;
pub mod http;
pub mod oauth_rest_adapter;
pub mod partner_rest_adapter;

pub use client_cache::{ClientCache, ClientConfig};
pub use oauth_rest_adapter::{OAuthRestAdapter, OAUTH_REST_ADAPTER_ID};
pub use partner_rest_adapter::{PartnerRestAdapter, PARTNER_REST_ADAPTER_ID};
pub use smartquote_types::{AdapterError, AdapterFactoryError, AdapterResult, CarrierAdapter};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of adapters keyed by adapter id
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
	adapters: HashMap<String, Arc<dyn CarrierAdapter>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the built-in adapters
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		for adapter in [
			Arc::new(PartnerRestAdapter::with_default_config()) as Arc<dyn CarrierAdapter>,
			Arc::new(OAuthRestAdapter::with_default_config()),
		] {
			// Built-in ids are distinct
			let _ = registry.register(adapter);
		}
		registry
	}

	/// Register an adapter; ids must be unique
	pub fn register(&mut self, adapter: Arc<dyn CarrierAdapter>) -> Result<(), AdapterFactoryError> {
		let adapter_id = adapter.id().to_string();
		if self.adapters.contains_key(&adapter_id) {
			return Err(AdapterFactoryError::AlreadyRegistered { adapter_id });
		}

		debug!("Registered adapter {} ({})", adapter_id, adapter.name());
		self.adapters.insert(adapter_id, adapter);
		Ok(())
	}

	/// Register an adapter, replacing any existing one with the same id
	pub fn register_or_replace(&mut self, adapter: Arc<dyn CarrierAdapter>) {
		self.adapters.insert(adapter.id().to_string(), adapter);
	}

	pub fn get(&self, adapter_id: &str) -> Option<Arc<dyn CarrierAdapter>> {
		self.adapters.get(adapter_id).cloned()
	}

	pub fn require(&self, adapter_id: &str) -> Result<Arc<dyn CarrierAdapter>, AdapterFactoryError> {
		self.get(adapter_id)
			.ok_or_else(|| AdapterFactoryError::NotRegistered {
				adapter_id: adapter_id.to_string(),
			})
	}

	pub fn contains(&self, adapter_id: &str) -> bool {
		self.adapters.contains_key(adapter_id)
	}

	pub fn get_all(&self) -> &HashMap<String, Arc<dyn CarrierAdapter>> {
		&self.adapters
	}

	/// Registered adapter ids, sorted
	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.adapters.keys().cloned().collect();
		ids.sort();
		ids
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_register_builtin_adapters() {
		let registry = AdapterRegistry::with_defaults();
		assert_eq!(
			registry.ids(),
			vec![OAUTH_REST_ADAPTER_ID.to_string(), PARTNER_REST_ADAPTER_ID.to_string()]
		);
		assert!(registry.get(PARTNER_REST_ADAPTER_ID).is_some());
		assert!(registry.get("soap-v1").is_none());
	}

	#[test]
	fn test_duplicate_registration_rejected() {
		let mut registry = AdapterRegistry::with_defaults();
		let result = registry.register(Arc::new(PartnerRestAdapter::with_default_config()));
		assert!(matches!(
			result,
			Err(AdapterFactoryError::AlreadyRegistered { adapter_id }) if adapter_id == PARTNER_REST_ADAPTER_ID
		));

		registry.register_or_replace(Arc::new(PartnerRestAdapter::with_default_config()));
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn test_require_reports_missing_adapter() {
		let registry = AdapterRegistry::new();
		assert!(registry.is_empty());
		assert!(matches!(
			registry.require("partner-rest-v1"),
			Err(AdapterFactoryError::NotRegistered { .. })
		));
	}
}
