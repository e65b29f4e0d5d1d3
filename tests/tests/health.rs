//! Tests for health check endpoints.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use telemetry::health;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let response = ctx.server().get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body.get("status").is_some(), "Response should have 'status' field");
    assert!(
        body["storage_connected"].is_boolean(),
        "Response should have boolean 'storage_connected' field"
    );
    assert!(
        body["events_appended"].as_u64().is_some(),
        "events_appended should be a valid u64 number"
    );
}

/// Readiness follows the storage component
#[tokio::test]
async fn test_ready_follows_storage() {
    let ctx = TestContext::new();
    let server = ctx.server();

    health().storage.set_healthy();
    server.get("/health/ready").await.assert_status_ok();

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage_connected"], true);

    health().storage.set_unhealthy("Connection failed");
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "unhealthy");
}

/// Test /health/live endpoint always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new();
    ctx.server().get("/health/live").await.assert_status_ok();
}
