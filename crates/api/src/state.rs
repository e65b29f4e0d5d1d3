//! Application state shared across handlers.

use analytics_core::{AnalyticsStore, LogSink};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Append side of the log (ClickHouse in production, in-memory in tests)
    pub sink: Arc<dyn LogSink>,
    /// Read side of the log
    pub store: Arc<dyn AnalyticsStore>,
}

impl AppState {
    pub fn new(sink: Arc<dyn LogSink>, store: Arc<dyn AnalyticsStore>) -> Self {
        Self { sink, store }
    }

    /// State backed by one store serving both the append and read sides.
    pub fn shared<S>(backend: Arc<S>) -> Self
    where
        S: LogSink + AnalyticsStore + 'static,
    {
        Self {
            sink: backend.clone(),
            store: backend,
        }
    }
}
