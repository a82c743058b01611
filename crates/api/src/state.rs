use std::sync::Arc;

use smartquote_service::SmartQuoteEngineTrait;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<dyn SmartQuoteEngineTrait>,
}

impl AppState {
	pub fn new(engine: Arc<dyn SmartQuoteEngineTrait>) -> Self {
		Self { engine }
	}
}
