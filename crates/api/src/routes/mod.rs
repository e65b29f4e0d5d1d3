//! API routes.

pub mod analytics;
pub mod health;
pub mod logs;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let analytics = Router::new()
        .route("/usage-by-type", get(analytics::usage_by_type))
        .route("/usage-by-filter", get(analytics::usage_by_filter))
        .route("/usage-by-period", get(analytics::usage_by_period))
        .route("/filter-activity", get(analytics::filter_activity))
        .route("/device-distribution", get(analytics::device_distribution))
        .route("/unique-users", get(analytics::unique_users))
        .route("/unique-sessions", get(analytics::unique_sessions))
        .route("/share-opened", get(analytics::share_opened));

    Router::new()
        .route("/logs", post(logs::append_handler))
        .nest("/analytics", analytics)
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
