//! Test server for integration tests

#![allow(dead_code)]

use smartquote::{EngineBuilder, Settings};
use tokio::task::JoinHandle;

use super::adapters::TimingControlledCarrier;

/// Engine served on an ephemeral local port
pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a server backed by the given mock carriers
	pub async fn spawn_with_carriers(
		carriers: Vec<TimingControlledCarrier>,
		timeout_ms: u64,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let mut builder = EngineBuilder::new().with_settings(Settings::default());
		for carrier in carriers {
			builder = builder
				.with_carrier(carrier.descriptor(timeout_ms))
				.with_adapter(carrier.shared());
		}

		let (app, _) = builder.start()?;
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Ok(Self {
			base_url: format!("http://{}", addr),
			handle,
		})
	}

	/// Spawn a server with no carriers configured
	pub async fn spawn_minimal() -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_carriers(Vec::new(), 1_000).await
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub fn abort(&self) {
		self.handle.abort();
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.handle.abort();
	}
}
