//! Single-row appends to the event log.

use crate::client::ClickHouseClient;
use analytics_core::{validate_log_event, Error, LogEvent, LogSink, Result};
use async_trait::async_trait;
use clickhouse::Row;
use serde::Serialize;
use tracing::debug;

/// Flattened log row for ClickHouse insertion.
#[derive(Debug, Clone, Row, Serialize)]
pub struct LogRow {
    pub user: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: i64, // milliseconds since epoch
    pub session: String,
    pub filter: Option<String>,
}

impl From<&LogEvent> for LogRow {
    fn from(event: &LogEvent) -> Self {
        Self {
            user: event.user.clone(),
            event_type: event.event_type.clone(),
            timestamp: event.timestamp.timestamp_millis(),
            session: event.session.clone(),
            filter: event.filter_id().map(str::to_string),
        }
    }
}

/// Append one event. The insert is a single statement, so the row is
/// either stored or the call fails.
pub async fn append_event(client: &ClickHouseClient, event: &LogEvent) -> Result<()> {
    validate_log_event(event)?;

    let start = std::time::Instant::now();
    let row = LogRow::from(event);

    let mut insert = client
        .inner()
        .insert::<LogRow>("log_datas")
        .map_err(|e| Error::append_failed(format!("Insert error: {}", e)))?;

    insert
        .write(&row)
        .await
        .map_err(|e| Error::append_failed(format!("Write error: {}", e)))?;

    insert
        .end()
        .await
        .map_err(|e| Error::append_failed(format!("End error: {}", e)))?;

    let elapsed = start.elapsed();
    debug!(
        event_type = %row.event_type,
        elapsed_ms = elapsed.as_millis() as u64,
        "Appended event to ClickHouse"
    );
    Ok(())
}

#[async_trait]
impl LogSink for ClickHouseClient {
    async fn append(&self, event: &LogEvent) -> Result<()> {
        append_event(self, event).await
    }

    fn is_healthy(&self) -> bool {
        telemetry::health().storage.is_healthy()
    }
}
