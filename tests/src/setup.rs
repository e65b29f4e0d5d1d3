//! Common test setup functions.

use analytics_core::{LogEvent, LogSink, MemoryLogStore};
use api::{router, state::AppState};
use axum::Router;
use axum_test::TestServer;
use std::sync::Arc;

use crate::fixtures;
use crate::mocks::{FailingStore, RecordingSink};

/// Test context with the real router over the in-memory log.
///
/// Exercises the same handler and validation paths as production; only
/// the storage backend differs.
pub struct TestContext {
    pub store: Arc<MemoryLogStore>,
    pub router: Router,
}

impl TestContext {
    /// Router over an empty log with the fixture filter catalog.
    pub fn new() -> Self {
        telemetry::init_tracing_from_env();
        let store = Arc::new(MemoryLogStore::with_filters(fixtures::catalog()));
        let router = router(AppState::shared(store.clone()));
        Self { store, router }
    }

    /// Router over the fixture catalog and `fixtures::sample_log()`.
    pub async fn seeded() -> Self {
        let ctx = Self::new();
        ctx.seed(fixtures::sample_log()).await;
        ctx
    }

    pub async fn seed(&self, events: Vec<LogEvent>) {
        for event in &events {
            self.store
                .append(event)
                .await
                .expect("Failed to seed event");
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Router whose sink records events and whose store always fails.
pub fn failing_store_server() -> (RecordingSink, TestServer) {
    let sink = RecordingSink::new();
    let state = AppState::new(Arc::new(sink.clone()), Arc::new(FailingStore));
    let server = TestServer::new(router(state)).expect("Failed to create test server");
    (sink, server)
}
