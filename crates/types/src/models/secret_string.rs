//! Zeroizing string for carrier credentials
//!
//! API keys, client secrets and access tokens are held in [`SecretString`],
//! which clears its buffer on drop and never prints its contents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	inner: String,
}

impl SecretString {
	pub fn new(secret: impl Into<String>) -> Self {
		Self {
			inner: secret.into(),
		}
	}

	/// Expose the secret value
	///
	/// Only call this at the point the secret goes on the wire.
	pub fn expose_secret(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self::new(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self::new(secret)
	}
}

// Secrets serialize redacted so results and logs never carry them
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
	}
}

impl Eq for SecretString {}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}

	a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_redacted_in_output() {
		let secret = SecretString::from("client-secret-123");
		assert_eq!(secret.expose_secret(), "client-secret-123");
		assert!(!format!("{:?}", secret).contains("client-secret"));
		assert_eq!(secret.to_string(), "[REDACTED]");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");
	}

	#[test]
	fn test_secret_deserializes_plain_value() {
		let secret: SecretString = serde_json::from_str("\"api-key\"").unwrap();
		assert_eq!(secret.expose_secret(), "api-key");
	}

	#[test]
	fn test_secret_equality() {
		assert_eq!(SecretString::from("same"), SecretString::from("same"));
		assert_ne!(SecretString::from("same"), SecretString::from("other"));
		assert_ne!(SecretString::from("same"), SecretString::from("same-but-longer"));
	}
}
