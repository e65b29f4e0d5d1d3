//! Tests for the aggregation endpoints over a seeded log.

use axum::http::StatusCode;
use integration_tests::{
    fixtures,
    setup::{failing_store_server, TestContext},
};
use serde_json::json;

#[tokio::test]
async fn test_usage_by_type_all_users() {
    let ctx = TestContext::seeded().await;
    let response = ctx.server().get("/analytics/usage-by-type").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!([
            { "type": "openLink", "count": 4 },
            { "type": "filterUsed", "count": 2 },
            { "type": "shareOpened", "count": 2 },
            { "type": "desktop_open", "count": 1 },
            { "type": "mobile_open", "count": 1 },
            { "type": "photoCapture", "count": 1 },
        ])
    );
}

#[tokio::test]
async fn test_usage_by_type_for_user() {
    let ctx = TestContext::seeded().await;
    let response = ctx
        .server()
        .get("/analytics/usage-by-type")
        .add_query_param("user", "1")
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!([
            { "type": "openLink", "count": 3 },
            { "type": "filterUsed", "count": 1 },
            { "type": "photoCapture", "count": 1 },
        ])
    );
}

#[tokio::test]
async fn test_usage_by_filter() {
    let ctx = TestContext::seeded().await;
    let response = ctx
        .server()
        .get("/analytics/usage-by-filter")
        .add_query_param("user", "1")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!([
            { "filter": "A", "photo_captures": 1, "filter_uses": 0, "total": 4 },
            { "filter": "B", "photo_captures": 0, "filter_uses": 1, "total": 1 },
        ])
    );
}

/// Two openLink rows on the same day share one daily bucket
#[tokio::test]
async fn test_usage_by_period_daily() {
    let ctx = TestContext::seeded().await;
    let response = ctx
        .server()
        .get("/analytics/usage-by-period")
        .add_query_param("user", "1")
        .add_query_param("filter", "A")
        .add_query_param("period", "daily")
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!([
            { "period": "2024-05-03", "count": 1 },
            { "period": "2024-05-01", "count": 2 },
        ])
    );
}

#[tokio::test]
async fn test_usage_by_period_weekly_and_monthly() {
    let ctx = TestContext::seeded().await;
    let server = ctx.server();

    let weekly: serde_json::Value = server
        .get("/analytics/usage-by-period")
        .add_query_param("user", "1")
        .add_query_param("filter", "A")
        .add_query_param("period", "weekly")
        .await
        .json();
    assert_eq!(weekly, json!([{ "period": "2024-W18", "count": 3 }]));

    let monthly: serde_json::Value = server
        .get("/analytics/usage-by-period")
        .add_query_param("user", "1")
        .add_query_param("filter", "A")
        .add_query_param("period", "monthly")
        .await
        .json();
    assert_eq!(monthly, json!([{ "period": "2024-05", "count": 3 }]));
}

/// Unknown period falls back to daily buckets
#[tokio::test]
async fn test_usage_by_period_unknown_period_defaults_daily() {
    let ctx = TestContext::seeded().await;
    let body: serde_json::Value = ctx
        .server()
        .get("/analytics/usage-by-period")
        .add_query_param("user", "1")
        .add_query_param("filter", "A")
        .add_query_param("period", "hourly")
        .await
        .json();

    assert_eq!(body[0]["period"], "2024-05-03");
}

#[tokio::test]
async fn test_filter_activity_counts_all_types() {
    let ctx = TestContext::seeded().await;
    let body: serde_json::Value = ctx
        .server()
        .get("/analytics/filter-activity")
        .add_query_param("filter", "A")
        .add_query_param("period", "monthly")
        .await
        .json();

    assert_eq!(
        body,
        json!([
            { "period": "2024-06", "count": 1 },
            { "period": "2024-05", "count": 8 },
        ])
    );
}

#[tokio::test]
async fn test_device_distribution() {
    let ctx = TestContext::seeded().await;
    let body: serde_json::Value = ctx
        .server()
        .get("/analytics/device-distribution")
        .add_query_param("filter", "A")
        .await
        .json();

    assert_eq!(body, json!({ "mobile": 1, "desktop": 1 }));
}

/// Catalog filters without rows still appear with a zero count
#[tokio::test]
async fn test_unique_users_includes_unused_filters() {
    let ctx = TestContext::seeded().await;
    let body: serde_json::Value = ctx.server().get("/analytics/unique-users").await.json();

    assert_eq!(
        body,
        json!([
            { "filter": "A", "name": "Sepia", "count": 3 },
            { "filter": "B", "name": "Glitter", "count": 1 },
            { "filter": "C", "name": "Neon", "count": 0 },
        ])
    );
}

#[tokio::test]
async fn test_unique_sessions_scoped_to_owner() {
    let ctx = TestContext::seeded().await;
    let body: serde_json::Value = ctx
        .server()
        .get("/analytics/unique-sessions")
        .add_query_param("owner", "owner-1")
        .await
        .json();

    assert_eq!(
        body,
        json!([
            { "filter": "A", "name": "Sepia", "count": 4 },
            { "filter": "B", "name": "Glitter", "count": 1 },
        ])
    );
}

#[tokio::test]
async fn test_share_opened_count() {
    let ctx = TestContext::seeded().await;
    let server = ctx.server();

    let body: serde_json::Value = server
        .get("/analytics/share-opened")
        .add_query_param("filter", "A")
        .await
        .json();
    assert_eq!(body, json!({ "filter": "A", "count": 2 }));

    let body: serde_json::Value = server
        .get("/analytics/share-opened")
        .add_query_param("filter", "B")
        .await
        .json();
    assert_eq!(body["count"], 0);
}

/// Rows appended through the API are visible to the next query
#[tokio::test]
async fn test_append_is_visible_to_views() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/logs")
        .json(&fixtures::log_body("9", "shareOpened", "device-9", Some("C")))
        .await
        .assert_status_ok();

    let body: serde_json::Value = server
        .get("/analytics/share-opened")
        .add_query_param("filter", "C")
        .await
        .json();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_missing_required_params_return_400() {
    let ctx = TestContext::seeded().await;
    let server = ctx.server();

    for path in [
        "/analytics/usage-by-filter",
        "/analytics/usage-by-period",
        "/analytics/filter-activity",
        "/analytics/device-distribution",
        "/analytics/unique-sessions",
        "/analytics/share-opened",
    ] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "VALID_001", "Expected VALID_001 for {}", path);
    }
}

/// Store failures surface as DB_002 rather than empty results
#[tokio::test]
async fn test_store_failure_returns_500() {
    let (_sink, server) = failing_store_server();

    let response = server.get("/analytics/unique-users").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DB_002");

    let response = server
        .get("/analytics/device-distribution")
        .add_query_param("filter", "A")
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
