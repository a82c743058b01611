use axum::{
	http::HeaderValue,
	routing::{get, post},
	Router,
};
use smartquote_config::ServerSettings;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::{warn, Level};

use crate::handlers::{get_carriers, health, post_smart_quote, post_smart_quote_ai, ready};
use crate::security::add_security_headers;
use crate::state::AppState;

/// Router with default server settings
pub fn create_router() -> Router<AppState> {
	create_router_with(&ServerSettings::default())
}

pub fn create_router_with(server: &ServerSettings) -> Router<AppState> {
	let cors = cors_layer(&server.cors_origins);
	let body_limit = RequestBodyLimitLayer::new(server.max_body_bytes);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let router = Router::new()
		.route("/health", get(health))
		.route("/ready", get(ready))
		.route("/v1/smart-quotes", post(post_smart_quote))
		.route("/v1/smart-quotes/ai", post(post_smart_quote_ai))
		.route("/v1/carriers", get(get_carriers))
		.layer(cors)
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	if origins.is_empty() {
		return CorsLayer::permissive();
	}

	let allowed: Vec<HeaderValue> = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				warn!("Ignoring invalid CORS origin '{}'", origin);
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(allowed))
		.allow_methods(tower_http::cors::Any)
		.allow_headers(tower_http::cors::Any)
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use rust_decimal::Decimal;
	use smartquote_service::SmartQuoteEngineTrait;
	use smartquote_types::{
		AiExtraction, CarrierDescriptor, CarrierQuote, Premium, ProductLine, RawApplicantData,
		ScoredQuote, SmartQuoteResult,
	};
	use std::collections::BTreeMap;
	use std::sync::Arc;
	use tower::ServiceExt;

	/// Quotes "acme" whenever a product line is present
	struct StubEngine;

	#[async_trait]
	impl SmartQuoteEngineTrait for StubEngine {
		async fn generate_smart_quote(&self, intake: RawApplicantData) -> SmartQuoteResult {
			if intake.product_line.is_none() {
				return SmartQuoteResult::failed("req-stub", "Cannot build quote request", vec![]);
			}
			let quote = CarrierQuote::new(
				"acme",
				Premium::from_annual(Decimal::from(1200)).unwrap(),
				0.1,
			);
			let mut result = SmartQuoteResult::failed("req-stub", "", vec![]);
			result.success = true;
			result.error = None;
			result.recommended_carrier = Some("acme".to_string());
			result.recommendation = Some(ScoredQuote {
				quote,
				profitability_score: 100.0,
				conversion_probability: 0.5,
				reliability: 1.0,
				composite_score: 0.8,
				rank: 1,
			});
			result
		}

		async fn generate_from_ai(&self, extraction: AiExtraction) -> SmartQuoteResult {
			self.generate_smart_quote(RawApplicantData::from(extraction)).await
		}

		fn carriers(&self) -> Vec<CarrierDescriptor> {
			vec![CarrierDescriptor::new(
				"acme",
				"partner-rest-v1",
				"https://internal.acme.example",
				vec![ProductLine::Auto],
			)]
		}

		async fn health(&self) -> BTreeMap<String, bool> {
			BTreeMap::from([("acme".to_string(), false)])
		}
	}

	fn app() -> Router {
		create_router().with_state(AppState::new(Arc::new(StubEngine)))
	}

	async fn body_json(response: axum::response::Response) -> serde_json::Value {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	fn post_json(uri: &str, body: &str) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	#[tokio::test]
	async fn test_health() {
		let response = app()
			.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		assert!(response.headers().contains_key("x-request-id"));
		assert_eq!(response.headers()["cache-control"], "no-store");
	}

	#[tokio::test]
	async fn test_ready_degraded_when_all_carriers_down() {
		let response = app()
			.oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
		let body = body_json(response).await;
		assert_eq!(body["status"], "degraded");
		assert_eq!(body["carriers"]["acme"], false);
	}

	#[tokio::test]
	async fn test_smart_quote_success() {
		let response = app()
			.oneshot(post_json(
				"/v1/smart-quotes",
				r#"{"productLine":"auto","age":30,"address":{"state":"TX"}}"#,
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["success"], true);
		assert_eq!(body["recommendedCarrier"], "acme");
	}

	#[tokio::test]
	async fn test_unsuccessful_result_is_still_ok() {
		let response = app()
			.oneshot(post_json("/v1/smart-quotes", "{}"))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["success"], false);
		assert!(body["recommendedCarrier"].is_null());
	}

	#[tokio::test]
	async fn test_ai_endpoint() {
		let response = app()
			.oneshot(post_json(
				"/v1/smart-quotes/ai",
				r#"{"insuranceType":"car","state":"ca","hasEnoughInfo":true}"#,
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(body_json(response).await["success"], true);
	}

	#[tokio::test]
	async fn test_malformed_body_is_bad_request() {
		let response = app()
			.oneshot(post_json("/v1/smart-quotes", "{not json"))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_json(response).await["error"], "INVALID_BODY");
	}

	#[tokio::test]
	async fn test_oversized_body_rejected() {
		let server = ServerSettings {
			max_body_bytes: 16,
			..Default::default()
		};
		let app = create_router_with(&server).with_state(AppState::new(Arc::new(StubEngine)));
		let response = app
			.oneshot(post_json(
				"/v1/smart-quotes",
				r#"{"productLine":"auto","firstName":"a very long name indeed"}"#,
			))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
	}

	#[tokio::test]
	async fn test_carriers_hide_endpoints() {
		let response = app()
			.oneshot(Request::builder().uri("/v1/carriers").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["total"], 1);
		assert_eq!(body["carriers"][0]["carrierId"], "acme");
		assert!(body["carriers"][0].get("endpoint").is_none());
	}
}
