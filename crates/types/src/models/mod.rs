//! Shared domain models used across entities

pub mod secret_string;

pub use secret_string::SecretString;
