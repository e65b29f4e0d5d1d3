//! Tests for the log append endpoint.
//!
//! Verifies that valid events land in the log as exactly one row and
//! that invalid events are rejected with coded errors and never stored.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};
use telemetry::metrics;

/// Valid event is appended and acknowledged
#[tokio::test]
async fn test_append_valid_event() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/logs")
        .json(&fixtures::log_body("42", "filterUsed", "device-1", Some("A")))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].as_i64().is_some());

    let rows = ctx.store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user, "42");
    assert_eq!(rows[0].event_type, "filterUsed");
    assert_eq!(rows[0].session, "device-1");
    assert_eq!(rows[0].filter.as_deref(), Some("A"));
}

/// Null filter is accepted and stored as absent
#[tokio::test]
async fn test_append_without_filter() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/logs")
        .json(&fixtures::log_body("42", "openLink", "device-1", None))
        .await
        .assert_status_ok();

    assert_eq!(ctx.store.rows()[0].filter, None);
}

/// Each request appends one row; repeated events are not deduplicated
#[tokio::test]
async fn test_repeated_events_each_append() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let body = fixtures::log_body("1", "photoCapture", "device-1", Some("B"));

    for _ in 0..3 {
        server.post("/logs").json(&body).await.assert_status_ok();
    }

    assert_eq!(ctx.store.len(), 3);
}

/// Invalid JSON returns VALID_001
#[tokio::test]
async fn test_invalid_json_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let before = metrics().events_rejected.get();
    let response = server
        .post("/logs")
        .content_type("application/json")
        .bytes("not json at all".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001", "Expected VALID_001 for invalid JSON");
    assert!(metrics().events_rejected.get() > before);
    assert!(ctx.store.is_empty());
}

/// Missing required field returns VALID_001
#[tokio::test]
async fn test_missing_session_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/logs")
        .json(&serde_json::json!({
            "user": "1",
            "type": "openLink",
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
    assert!(ctx.store.is_empty());
}

/// Session ids longer than 30 characters are rejected
#[tokio::test]
async fn test_oversized_session_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let session = "x".repeat(31);

    let response = server
        .post("/logs")
        .json(&fixtures::log_body("1", "openLink", &session, None))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.is_empty());
}

/// Empty user is rejected
#[tokio::test]
async fn test_empty_user_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/logs")
        .json(&fixtures::log_body("", "openLink", "device-1", None))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

/// Oversized payload returns VALID_002
#[tokio::test]
async fn test_oversized_payload_returns_413() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut body = fixtures::log_body("1", "openLink", "device-1", None);
    body["padding"] = serde_json::Value::String("x".repeat(10_000));

    let response = server.post("/logs").json(&body).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_002");
    assert!(ctx.store.is_empty());
}

/// Sink failure surfaces as DB_001 and nothing is stored
#[tokio::test]
async fn test_sink_failure_returns_500() {
    let (sink, server) = integration_tests::setup::failing_store_server();
    sink.set_should_fail(true);

    let response = server
        .post("/logs")
        .json(&fixtures::log_body("1", "openLink", "device-1", None))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DB_001");
    assert_eq!(sink.event_count(), 0);
}

/// Signed-in clients post numeric user ids; they are stored as text
#[tokio::test]
async fn test_append_numeric_user() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/logs")
        .json(&serde_json::json!({
            "user": 180001,
            "type": "openLink",
            "timestamp": "2024-05-01T10:00:00.000Z",
            "session": "a1b2c3",
            "filter": null
        }))
        .await
        .assert_status_ok();

    let rows = ctx.store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user, "180001");

    let body: serde_json::Value = server
        .get("/analytics/usage-by-type")
        .add_query_param("user", "180001")
        .await
        .json();
    assert_eq!(body[0]["count"], 1);
}
