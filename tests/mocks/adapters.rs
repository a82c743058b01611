//! Timing-controlled mock carriers
//!
//! Each mock is its own adapter (`timing-{carrier}`) so a test can pair one
//! behaviour with one carrier descriptor.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use smartquote::rust_decimal::Decimal;
use smartquote::types::{
	Adapter, AdapterError, AdapterResult, CarrierRuntimeConfig, Premium,
};
use smartquote::{CarrierAdapter, CarrierDescriptor, CarrierQuote, FailureKind, ProductLine, QuoteRequest};

/// Call tracking for verifying which carriers were dispatched and finished
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
	started: Arc<AtomicUsize>,
	completed: Arc<AtomicUsize>,
}

impl CallTracker {
	pub fn started(&self) -> usize {
		self.started.load(Ordering::SeqCst)
	}

	pub fn completed(&self) -> usize {
		self.completed.load(Ordering::SeqCst)
	}
}

#[derive(Debug, Clone)]
pub enum Behavior {
	Quote { annual: i64, commission: f64 },
	Fail(FailureKind),
	/// Never resolves
	Hang,
}

/// Mock carrier that answers after a configurable delay
#[derive(Debug, Clone)]
pub struct TimingControlledCarrier {
	pub carrier_id: String,
	adapter: Adapter,
	behavior: Behavior,
	delay_ms: u64,
	pub tracker: CallTracker,
}

impl TimingControlledCarrier {
	pub fn new(carrier_id: &str, behavior: Behavior, delay_ms: u64) -> Self {
		Self {
			carrier_id: carrier_id.to_string(),
			adapter: Adapter::new(
				format!("timing-{}", carrier_id),
				format!("Timing-controlled mock for {}", carrier_id),
				format!("Mock {}", carrier_id),
				"1.0.0".to_string(),
			),
			behavior,
			delay_ms,
			tracker: CallTracker::default(),
		}
	}

	/// Quotes `annual` after ~50ms with a 10% commission
	pub fn quoting(carrier_id: &str, annual: i64) -> Self {
		Self::new(
			carrier_id,
			Behavior::Quote {
				annual,
				commission: 0.10,
			},
			50,
		)
	}

	pub fn quoting_with_commission(carrier_id: &str, annual: i64, commission: f64) -> Self {
		Self::new(carrier_id, Behavior::Quote { annual, commission }, 50)
	}

	pub fn failing(carrier_id: &str, kind: FailureKind) -> Self {
		Self::new(carrier_id, Behavior::Fail(kind), 20)
	}

	pub fn hanging(carrier_id: &str) -> Self {
		Self::new(carrier_id, Behavior::Hang, 0)
	}

	pub fn adapter_id(&self) -> &str {
		&self.adapter.adapter_id
	}

	/// Descriptor for this carrier serving every product line
	pub fn descriptor(&self, timeout_ms: u64) -> CarrierDescriptor {
		CarrierDescriptor::new(
			self.carrier_id.clone(),
			self.adapter.adapter_id.clone(),
			format!("http://{}.carrier.test", self.carrier_id),
			vec![ProductLine::Auto, ProductLine::Home, ProductLine::Commercial],
		)
		.with_timeout_ms(timeout_ms)
	}

	pub fn shared(self) -> Arc<dyn CarrierAdapter> {
		Arc::new(self)
	}
}

fn error_for(kind: FailureKind, carrier_id: &str) -> AdapterError {
	match kind {
		FailureKind::Timeout => AdapterError::Timeout { timeout_ms: 1 },
		FailureKind::Auth => AdapterError::AuthenticationFailed {
			carrier_id: carrier_id.to_string(),
			reason: "token rejected".to_string(),
		},
		FailureKind::ValidationRejected => AdapterError::Rejected {
			code: "UNDERWRITING".to_string(),
			message: "applicant outside appetite".to_string(),
		},
		FailureKind::MalformedResponse => AdapterError::InvalidResponse {
			reason: "unexpected body".to_string(),
		},
		FailureKind::Unavailable | FailureKind::Ineligible => AdapterError::Unavailable {
			reason: "maintenance window".to_string(),
		},
	}
}

#[async_trait]
impl CarrierAdapter for TimingControlledCarrier {
	fn adapter_info(&self) -> &Adapter {
		&self.adapter
	}

	async fn get_quote(
		&self,
		_request: &QuoteRequest,
		config: &CarrierRuntimeConfig,
	) -> AdapterResult<CarrierQuote> {
		self.tracker.started.fetch_add(1, Ordering::SeqCst);

		if let Behavior::Hang = self.behavior {
			std::future::pending::<()>().await;
		}
		tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
		self.tracker.completed.fetch_add(1, Ordering::SeqCst);

		match &self.behavior {
			Behavior::Quote { annual, commission } => {
				let premium = Premium::from_annual(Decimal::from(*annual))?;
				Ok(CarrierQuote::new(config.carrier_id.clone(), premium, *commission)
					.with_response_time(self.delay_ms))
			},
			Behavior::Fail(kind) => Err(error_for(*kind, &config.carrier_id)),
			Behavior::Hang => Err(AdapterError::Unavailable {
				reason: "unreachable".to_string(),
			}),
		}
	}

	async fn health_check(&self, _config: &CarrierRuntimeConfig) -> AdapterResult<bool> {
		Ok(!matches!(self.behavior, Behavior::Fail(_) | Behavior::Hang))
	}
}
