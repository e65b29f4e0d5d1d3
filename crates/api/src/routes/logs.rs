//! Log append endpoint.
//!
//! Accepts one LogEvent JSON object per request. The event is validated
//! before it reaches the sink, so an invalid row is never stored.

use analytics_core::{error::ValidationErrorCode, limits::MAX_LOG_BODY_BYTES, parse_log_event};
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, error, warn};

use crate::response::{ApiError, LogResponse};
use crate::state::AppState;

/// POST /logs - Append one event to the log.
pub async fn append_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LogResponse>, ApiError> {
    let start = Instant::now();

    if body.len() > MAX_LOG_BODY_BYTES {
        metrics().events_rejected.inc();
        return Err(ApiError::validation(
            StatusCode::PAYLOAD_TOO_LARGE,
            ValidationErrorCode::PayloadTooLarge.code(),
            vec![format!(
                "Payload size {} bytes exceeds {} byte limit",
                body.len(),
                MAX_LOG_BODY_BYTES
            )],
        ));
    }

    let event = parse_log_event(&body).map_err(|e| {
        metrics().events_rejected.inc();
        warn!(error = %e, "Rejected log event");
        ApiError::from(e)
    })?;

    state.sink.append(&event).await.map_err(|e| {
        metrics().append_errors.inc();
        error!(event_type = %event.event_type, error = %e, "Failed to append log event");
        ApiError::from(e)
    })?;

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().events_appended.inc();
    metrics().append_latency_ms.observe(latency_ms);
    debug!(
        event_type = %event.event_type,
        filter = ?event.filter,
        latency_ms,
        "Log event appended"
    );

    Ok(Json(LogResponse::success()))
}
