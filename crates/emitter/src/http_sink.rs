//! Log sink that posts events to the append endpoint.

use analytics_core::{Error, LogEvent, LogSink, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::EmitterConfig;

/// Sends one event per request to the log append endpoint.
#[derive(Clone)]
pub struct HttpLogSink {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpLogSink {
    /// Creates a sink for the configured endpoint and timeout.
    pub fn new(config: &EmitterConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LogSink for HttpLogSink {
    async fn append(&self, event: &LogEvent) -> Result<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map_err(|e| Error::transport(format!("log endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "log endpoint returned {}: {}",
                status, body
            )));
        }

        debug!(endpoint = %self.endpoint, event_type = %event.event_type, "Event posted");
        Ok(())
    }
}
