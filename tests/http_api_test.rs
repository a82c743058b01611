//! HTTP surface tests against a served engine

mod mocks;

use mocks::{Fixtures, TestServer, TimingControlledCarrier};
use smartquote::rust_decimal::Decimal;
use smartquote::serde_json::{json, Value};
use smartquote::FailureKind;

async fn spawn_default() -> TestServer {
	TestServer::spawn_with_carriers(
		vec![
			TimingControlledCarrier::quoting("acme", 1180),
			TimingControlledCarrier::quoting("northstar", 1040),
			TimingControlledCarrier::failing("lockbox", FailureKind::Auth),
		],
		500,
	)
	.await
	.expect("server should start")
}

#[tokio::test]
async fn test_health_and_ready() {
	let server = spawn_default().await;
	let client = reqwest::Client::new();

	let health = client.get(server.url("/health")).send().await.unwrap();
	assert_eq!(health.status(), 200);
	assert_eq!(health.text().await.unwrap(), "OK");

	let ready = client.get(server.url("/ready")).send().await.unwrap();
	assert_eq!(ready.status(), 200);
	let body: Value = ready.json().await.unwrap();
	assert_eq!(body["status"], "ready");
	assert_eq!(body["carriers"]["acme"], true);
	assert_eq!(body["carriers"]["lockbox"], false);
}

#[tokio::test]
async fn test_smart_quote_over_http() {
	let server = spawn_default().await;

	let response = reqwest::Client::new()
		.post(server.url("/v1/smart-quotes"))
		.json(&Fixtures::auto_intake_json())
		.send()
		.await
		.unwrap();
	assert_eq!(response.status(), 200);
	assert!(response.headers().contains_key("x-request-id"));

	let body: Value = response.json().await.unwrap();
	assert_eq!(body["success"], true);
	assert_eq!(body["metrics"]["carriersQueried"], 3);
	assert_eq!(body["metrics"]["carriersQuoted"], 2);
	let savings: Decimal = body["metrics"]["estimatedSavings"]
		.as_str()
		.unwrap()
		.parse()
		.unwrap();
	assert_eq!(savings, Decimal::from(140));
	assert_eq!(body["failures"][0]["carrierId"], "lockbox");
	assert_eq!(body["failures"][0]["kind"], "auth");
	assert!(body["recommendedCarrier"].is_string());
	assert_eq!(body["riskProfile"]["missingFields"], json!([]));
}

#[tokio::test]
async fn test_ai_extraction_over_http() {
	let server = spawn_default().await;

	let body: Value = reqwest::Client::new()
		.post(server.url("/v1/smart-quotes/ai"))
		.json(&Fixtures::ai_extraction_json())
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_incomplete_intake_is_a_result_not_an_error() {
	let server = spawn_default().await;

	let response = reqwest::Client::new()
		.post(server.url("/v1/smart-quotes"))
		.json(&json!({ "firstName": "Pat" }))
		.send()
		.await
		.unwrap();
	assert_eq!(response.status(), 200);

	let body: Value = response.json().await.unwrap();
	assert_eq!(body["success"], false);
	assert!(body["recommendedCarrier"].is_null());
	assert!(body["error"].as_str().unwrap().contains("product_line"));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
	let server = spawn_default().await;

	let response = reqwest::Client::new()
		.post(server.url("/v1/smart-quotes"))
		.header("content-type", "application/json")
		.body("{\"productLine\": ")
		.send()
		.await
		.unwrap();
	assert_eq!(response.status(), 400);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body["error"], "INVALID_BODY");
}

#[tokio::test]
async fn test_carriers_listing() {
	let server = spawn_default().await;

	let body: Value = reqwest::get(server.url("/v1/carriers"))
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["total"], 3);
	let ids: Vec<&str> = body["carriers"]
		.as_array()
		.unwrap()
		.iter()
		.map(|c| c["carrierId"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["acme", "lockbox", "northstar"]);
}

#[tokio::test]
async fn test_no_carriers_reports_failure() {
	let server = TestServer::spawn_minimal().await.unwrap();

	let body: Value = reqwest::Client::new()
		.post(server.url("/v1/smart-quotes"))
		.json(&Fixtures::auto_intake_json())
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["success"], false);
	assert_eq!(body["error"], "No eligible carriers for this request");
}
