//! Shared mocks and fixtures for integration tests

pub mod adapters;
pub mod fixtures;
pub mod test_server;

#[allow(unused_imports)]
pub use adapters::{Behavior, TimingControlledCarrier};
#[allow(unused_imports)]
pub use fixtures::Fixtures;
#[allow(unused_imports)]
pub use test_server::TestServer;
