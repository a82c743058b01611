//! SmartQuote Engine Server
//!
//! Main entry point for the quote engine server

use smartquote::EngineBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	EngineBuilder::new().start_server().await?;
	Ok(())
}
