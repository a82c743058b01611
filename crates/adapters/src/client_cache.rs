//! HTTP client cache for carrier connections
//!
//! Provides one pooled `reqwest::Client` per carrier configuration. Auth
//! headers are applied per request by the adapters and are never part of the
//! cache key, so rotating a token does not rebuild the client.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use smartquote_types::{AdapterError, AdapterResult, CarrierRuntimeConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Cache key and build parameters for one carrier client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	pub base_url: String,
	pub carrier_id: String,
	pub max_idle_per_host: usize,
	pub keep_alive_timeout_ms: u64,
	/// Static headers (adapter identification plus carrier-configured headers)
	pub headers: Vec<(String, String)>,
}

impl ClientConfig {
	pub fn for_carrier(config: &CarrierRuntimeConfig, adapter_tag: &str) -> Self {
		let mut headers = vec![
			("User-Agent".to_string(), "SmartQuote-Engine/1.0".to_string()),
			("Accept".to_string(), "application/json".to_string()),
			("X-Adapter-Type".to_string(), adapter_tag.to_string()),
		];

		if let Some(carrier_headers) = &config.headers {
			let mut extra: Vec<(String, String)> = carrier_headers
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect();
			// HashMap order is random; keep the cache key stable
			extra.sort();
			headers.extend(extra);
		}

		Self {
			base_url: config.endpoint.clone(),
			carrier_id: config.carrier_id.clone(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers,
		}
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe, TTL-bounded cache of carrier HTTP clients
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with a 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create a client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> AdapterResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				warn!(
					"Client cache expired for carrier {} (age: {:?}), will create new client",
					config.carrier_id,
					cached.created_at.elapsed()
				);
			}
			expired
		});

		if let Some(cached) = self.clients.get(config) {
			debug!("Reusing cached client for carrier {}", config.carrier_id);
			return Ok(cached.client.clone());
		}

		debug!("Creating new client for carrier {}", config.carrier_id);
		let cached = CachedClient::new(Self::build_client(config)?);

		match self.clients.entry(config.clone()) {
			// Another task created one concurrently; use theirs
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => {
				let client = cached.client.clone();
				entry.insert(cached);
				Ok(client)
			},
		}
	}

	fn build_client(config: &ClientConfig) -> AdapterResult<Client> {
		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			if let (Ok(name), Ok(value)) = (
				reqwest::header::HeaderName::from_bytes(key.as_bytes()),
				reqwest::header::HeaderValue::from_str(value),
			) {
				header_map.insert(name, value);
			}
		}

		ClientBuilder::new()
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.default_headers(header_map)
			.build()
			.map_err(AdapterError::HttpError)
	}

	/// Remove all expired clients, returning how many were dropped
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, cached| !cached.is_expired(self.ttl));
		let removed = before.saturating_sub(self.clients.len());
		if removed > 0 {
			debug!("Cleaned up {} expired carrier clients", removed);
		}
		removed
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}
