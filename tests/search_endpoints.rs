//! Router-level tests for the ingestion endpoints.
//!
//! Request validation must fire before any network call, so these run
//! against a default config whose upstream endpoints are never reached.

use std::sync::Arc;

use anbud::handler::create_router;
use anbud::models::Config;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http::header::CONTENT_TYPE;
use tower::ServiceExt;

fn router() -> Router {
    create_router(Arc::new(Config::default()))
}

async fn post_json(uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_inverted_range_rejected_with_error_envelope() {
    let (status, body) = post_json(
        "/api/doffin/search",
        r#"{"from": "2024-02-01", "to": "2024-01-01"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error envelope");
    assert!(message.contains("must not be after"), "{message}");
}

#[tokio::test]
async fn test_malformed_from_date_rejected() {
    let (status, body) = post_json(
        "/api/listing/search",
        r#"{"from": "01.02.2024", "to": "2024-02-28"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid 'from'"));
}

#[tokio::test]
async fn test_both_endpoints_validate_identically() {
    for uri in ["/api/doffin/search", "/api/listing/search"] {
        let (status, body) = post_json(uri, r#"{"from": "2025-01-01", "to": "2024-01-01"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.get("error").is_some(), "{uri}");
        assert!(body.get("results").is_none(), "{uri}");
    }
}
