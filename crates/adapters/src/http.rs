//! Shared HTTP helpers for carrier adapters

use reqwest::Response;
use serde::de::DeserializeOwned;
use smartquote_types::{AdapterError, AdapterResult};
use tracing::debug;
use url::Url;

/// Join a carrier endpoint with a relative path
///
/// The base is treated as a directory, so `https://c.example/api` joined with
/// `quotes` yields `https://c.example/api/quotes`.
pub fn build_url(base_url: &str, path: &str) -> AdapterResult<String> {
	let mut base = Url::parse(base_url).map_err(|e| AdapterError::ConfigError {
		reason: format!("Invalid base URL '{}': {}", base_url, e),
	})?;

	if !base.path().ends_with('/') {
		base.set_path(&format!("{}/", base.path()));
	}

	let joined = base
		.join(path.trim_start_matches('/'))
		.map_err(|e| AdapterError::ConfigError {
			reason: format!(
				"Failed to join URL path '{}' to base '{}': {}",
				path, base_url, e
			),
		})?;

	Ok(joined.to_string())
}

/// Read the full response body as text
pub async fn read_body(response: Response) -> AdapterResult<String> {
	let body = response.text().await.map_err(AdapterError::HttpError)?;
	debug!("Carrier responded with {} bytes", body.len());
	Ok(body)
}

/// Parse a carrier body, reporting schema mismatches as malformed responses
pub fn parse_body<T: DeserializeOwned>(body: &str, context: &str) -> AdapterResult<T> {
	serde_json::from_str(body).map_err(|e| AdapterError::InvalidResponse {
		reason: format!("Failed to parse {}: {}", context, e),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[test]
	fn test_build_url_treats_base_as_directory() {
		assert_eq!(
			build_url("https://carrier.example.com/api", "quotes").unwrap(),
			"https://carrier.example.com/api/quotes"
		);
		assert_eq!(
			build_url("https://carrier.example.com/api/", "/quotes").unwrap(),
			"https://carrier.example.com/api/quotes"
		);
		assert_eq!(
			build_url("http://localhost:8080", "oauth/token").unwrap(),
			"http://localhost:8080/oauth/token"
		);
	}

	#[test]
	fn test_build_url_rejects_invalid_base() {
		assert!(matches!(
			build_url("not a url", "quotes"),
			Err(AdapterError::ConfigError { .. })
		));
	}

	#[test]
	fn test_parse_body_maps_to_invalid_response() {
		#[derive(Debug, Deserialize)]
		struct Body {
			#[allow(dead_code)]
			value: u32,
		}

		assert!(parse_body::<Body>(r#"{"value": 3}"#, "test body").is_ok());
		let err = parse_body::<Body>("<html>", "test body").unwrap_err();
		assert!(matches!(err, AdapterError::InvalidResponse { .. }));
		assert!(err.to_string().contains("test body"));
	}
}
