//! Aggregation endpoints.
//!
//! Each handler maps query parameters onto one `AnalyticsStore` view.
//! Store failures surface as errors; nothing is retried here.

use analytics_core::{
    DeviceDistribution, FilterReach, FilterUsage, Period, PeriodCount, Result, TypeCount,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::future::Future;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, error};

use crate::response::{ApiError, ShareCount};
use crate::state::AppState;

/// Query parameters accepted by the aggregation endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub user: Option<String>,
    pub filter: Option<String>,
    pub period: Option<String>,
    pub owner: Option<String>,
}

/// Returns the named parameter, treating an empty value as absent.
fn required<'a>(value: &'a Option<String>, name: &str) -> std::result::Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::missing_param(name)),
    }
}

/// Runs one view query, recording latency and outcome.
async fn serve<T, F>(view: &'static str, query: F) -> std::result::Result<Json<T>, ApiError>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = query.await;
    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().query_latency_ms.observe(latency_ms);

    match result {
        Ok(value) => {
            metrics().queries_served.inc();
            debug!(view, latency_ms, "View served");
            Ok(Json(value))
        }
        Err(e) => {
            metrics().query_errors.inc();
            error!(view, error = %e, "View query failed");
            Err(ApiError::from(e))
        }
    }
}

/// GET /analytics/usage-by-type
pub async fn usage_by_type(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<Vec<TypeCount>>, ApiError> {
    let user = params.user.as_deref().filter(|u| !u.is_empty());
    serve("usage_by_type", state.store.usage_by_type(user)).await
}

/// GET /analytics/usage-by-filter
pub async fn usage_by_filter(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<Vec<FilterUsage>>, ApiError> {
    let user = required(&params.user, "user")?;
    serve("usage_by_filter", state.store.usage_by_filter(user)).await
}

/// GET /analytics/usage-by-period
pub async fn usage_by_period(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<Vec<PeriodCount>>, ApiError> {
    let user = required(&params.user, "user")?;
    let filter = required(&params.filter, "filter")?;
    let period = Period::parse_or_daily(params.period.as_deref());
    serve(
        "usage_by_period",
        state.store.usage_by_period(user, filter, period),
    )
    .await
}

/// GET /analytics/filter-activity
pub async fn filter_activity(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<Vec<PeriodCount>>, ApiError> {
    let filter = required(&params.filter, "filter")?;
    let period = Period::parse_or_daily(params.period.as_deref());
    serve(
        "filter_activity_by_period",
        state.store.filter_activity_by_period(filter, period),
    )
    .await
}

/// GET /analytics/device-distribution
pub async fn device_distribution(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<DeviceDistribution>, ApiError> {
    let filter = required(&params.filter, "filter")?;
    serve("device_distribution", state.store.device_distribution(filter)).await
}

/// GET /analytics/unique-users
pub async fn unique_users(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<FilterReach>>, ApiError> {
    serve("unique_users_per_filter", state.store.unique_users_per_filter()).await
}

/// GET /analytics/unique-sessions
pub async fn unique_sessions(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<Vec<FilterReach>>, ApiError> {
    let owner = required(&params.owner, "owner")?;
    serve(
        "unique_sessions_per_filter",
        state.store.unique_sessions_per_filter(owner),
    )
    .await
}

/// GET /analytics/share-opened
pub async fn share_opened(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> std::result::Result<Json<ShareCount>, ApiError> {
    let filter = required(&params.filter, "filter")?;
    let count = serve("share_opened_count", state.store.share_opened_count(filter)).await?;
    Ok(Json(ShareCount {
        filter: filter.to_string(),
        count: count.0,
    }))
}
