//! SmartQuote API
//!
//! Axum routes and middleware exposing the SmartQuote engine over HTTP.

pub mod handlers;
pub mod router;
pub mod security;
pub mod state;

pub use router::{create_router, create_router_with};
pub use state::AppState;
