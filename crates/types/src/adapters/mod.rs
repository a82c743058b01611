//! Adapter domain model

pub mod errors;
pub mod traits;

pub use errors::{AdapterError, AdapterFactoryError, AdapterValidationError};
pub use traits::CarrierAdapter;

/// Result types for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
pub type AdapterValidationResult<T> = Result<T, AdapterValidationError>;

/// Identity of an adapter implementation
#[derive(Debug, Clone, PartialEq)]
pub struct Adapter {
	/// Unique identifier, referenced by carrier descriptors
	pub adapter_id: String,

	/// Human-readable name
	pub name: String,

	pub description: Option<String>,

	/// Version of the adapter implementation
	pub version: String,
}

impl Adapter {
	pub fn new(adapter_id: String, description: String, name: String, version: String) -> Self {
		Self {
			adapter_id,
			name,
			description: Some(description),
			version,
		}
	}

	pub fn validate(&self) -> AdapterValidationResult<()> {
		if self.adapter_id.is_empty() {
			return Err(AdapterValidationError::MissingRequiredField {
				field: "adapter_id".to_string(),
			});
		}

		if !self
			.adapter_id
			.chars()
			.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
		{
			return Err(AdapterValidationError::InvalidAdapterId {
				adapter_id: self.adapter_id.clone(),
			});
		}

		if self.name.is_empty() {
			return Err(AdapterValidationError::MissingRequiredField {
				field: "name".to_string(),
			});
		}

		if !is_valid_semver(&self.version) {
			return Err(AdapterValidationError::InvalidVersion {
				version: self.version.clone(),
			});
		}

		Ok(())
	}
}

/// Basic semver validation: X.Y.Z where X, Y, Z are numbers
fn is_valid_semver(version: &str) -> bool {
	let parts: Vec<&str> = version.split('.').collect();
	if parts.len() != 3 {
		return false;
	}

	parts.iter().all(|part| part.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn create_test_adapter() -> Adapter {
		Adapter::new(
			"test-adapter".to_string(),
			"Partner REST".to_string(),
			"Test Adapter".to_string(),
			"1.0.0".to_string(),
		)
	}

	#[test]
	fn test_adapter_validation() {
		assert!(create_test_adapter().validate().is_ok());

		let mut bad_id = create_test_adapter();
		bad_id.adapter_id = "bad id!".to_string();
		assert!(matches!(
			bad_id.validate(),
			Err(AdapterValidationError::InvalidAdapterId { .. })
		));

		let mut bad_version = create_test_adapter();
		bad_version.version = "1.0".to_string();
		assert!(matches!(
			bad_version.validate(),
			Err(AdapterValidationError::InvalidVersion { .. })
		));
	}
}
