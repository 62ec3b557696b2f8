//! Tests for health check endpoints.

use std::sync::Arc;

use axum::http::StatusCode;
use integration_tests::{mocks::FailingStore, setup::TestContext};
use serde_json::Value;

#[tokio::test]
async fn test_liveness_needs_no_storage() {
    let ctx = TestContext::with_store(Arc::new(FailingStore::new()));

    let response = ctx.server().get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

/// Readiness follows the store probe. Both cases run in one test because the
/// health registry is process-wide.
#[tokio::test]
async fn test_readiness_follows_store_probe() {
    let healthy = TestContext::in_memory();
    let response = healthy.server().get("/health/ready").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["components"][0]["name"], "store");
    assert_eq!(body["components"][0]["healthy"], true);

    let failing = TestContext::with_store(Arc::new(FailingStore::new()));
    let response = failing.server().get("/health/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["components"][0]["healthy"], false);
    assert_eq!(body["components"][0]["message"], "store ping failed");

    healthy
        .server()
        .get("/health/ready")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_cors_allows_dashboard_origin() {
    let ctx = TestContext::in_memory();

    let response = ctx
        .server()
        .get("/health")
        .add_header("Origin", "http://localhost:5173")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header("access-control-allow-origin"),
        "http://localhost:5173"
    );
    assert_eq!(response.header("access-control-allow-credentials"), "true");

    let response = ctx
        .server()
        .get("/health")
        .add_header("Origin", "http://evil.example")
        .await;
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
