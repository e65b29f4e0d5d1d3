//! End-to-end tests from the client emitter to the aggregation views.

use analytics_core::{AnalyticsStore, LogSink, MemoryLogStore};
use api::{router, AppState};
use emitter::{
    BurstConfig, EmitterConfig, EventEmitter, HttpLogSink, IdentityStore, KeyValueStore,
    MemoryStorage, SledStorage,
};
use integration_tests::{
    fixtures,
    mocks::{FlakyStorage, RecordingSink},
};
use std::sync::Arc;

fn emitter_over(
    storage: Arc<dyn KeyValueStore>,
    sink: Arc<dyn LogSink>,
    user_agent: &str,
) -> EventEmitter {
    let identity = Arc::new(IdentityStore::new(storage));
    EventEmitter::for_user_agent(identity, sink, user_agent, BurstConfig::default())
}

/// First mobile visit produces one burst that shows up in the views
#[tokio::test]
async fn test_mobile_first_visit_reaches_views() {
    let store = Arc::new(MemoryLogStore::with_filters(fixtures::catalog()));
    let emitter = emitter_over(Arc::new(MemoryStorage::new()), store.clone(), fixtures::IPHONE_UA);

    for _ in 0..3 {
        emitter.log_event("photoCapture", Some("A")).await;
    }
    emitter.flush().await;

    let user = store.rows()[0].user.clone();
    let usage = store.usage_by_type(Some(&user)).await.unwrap();
    let count = |t: &str| usage.iter().find(|u| u.event_type == t).map_or(0, |u| u.count);
    assert_eq!(count("photoCapture"), 3);
    assert_eq!(count("cameraAccess"), 1);
    assert_eq!(count("mediaCaptured"), 1);
    assert_eq!(count("mobile_open"), 1);

    let devices = store.device_distribution("A").await.unwrap();
    assert_eq!((devices.mobile, devices.desktop), (1, 0));

    let reach = store.unique_sessions_per_filter("owner-1").await.unwrap();
    assert_eq!(reach[0].filter, "A");
    assert_eq!(reach[0].count, 1);
}

/// Android user agents are classified as mobile too
#[tokio::test]
async fn test_android_counts_as_mobile() {
    let store = Arc::new(MemoryLogStore::new());
    let emitter = emitter_over(Arc::new(MemoryStorage::new()), store.clone(), fixtures::ANDROID_UA);

    emitter.log_event("openLink", Some("B")).await;
    emitter.flush().await;

    let devices = store.device_distribution("B").await.unwrap();
    assert_eq!(devices.mobile, 1);
}

/// The burst guard and identity survive a client restart
#[tokio::test]
async fn test_profile_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile");
    let store = Arc::new(MemoryLogStore::new());

    {
        let storage = Arc::new(SledStorage::open(&path).unwrap());
        let emitter = emitter_over(storage, store.clone(), fixtures::IPHONE_UA);
        emitter.log_event("photoCapture", None).await;
        emitter.flush().await;
    }
    let first_visit = store.len();
    assert_eq!(first_visit, 4);

    {
        let storage = Arc::new(SledStorage::open(&path).unwrap());
        let emitter = emitter_over(storage, store.clone(), fixtures::IPHONE_UA);
        emitter.log_event("photoCapture", None).await;
        emitter.flush().await;
    }

    let rows = store.rows();
    assert_eq!(rows.len(), first_visit + 1);
    assert!(rows.iter().all(|r| r.user == rows[0].user));
    assert!(rows.iter().all(|r| r.session == rows[0].session));
}

/// An authenticated user id takes precedence over the temporary id
#[tokio::test]
async fn test_authenticated_user_is_logged() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("user", r#"{"id":77,"name":"Ada"}"#).unwrap();
    let store = Arc::new(MemoryLogStore::new());
    let emitter = emitter_over(storage, store.clone(), fixtures::DESKTOP_UA);

    emitter.log_event("openLink", None).await;
    emitter.flush().await;

    assert!(store.rows().iter().all(|r| r.user == "77"));
}

/// Unreadable storage still logs the primary event but never bursts
#[tokio::test]
async fn test_broken_storage_skips_burst() {
    let storage = Arc::new(FlakyStorage::new());
    storage.set_should_fail(true);
    let store = Arc::new(MemoryLogStore::new());
    let emitter = emitter_over(storage, store.clone(), fixtures::IPHONE_UA);

    emitter.log_event("photoCapture", None).await;
    emitter.flush().await;

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event_type, "photoCapture");
}

/// Transport failures never reach the caller
#[tokio::test]
async fn test_sink_failure_is_invisible_to_caller() {
    let sink = RecordingSink::new();
    sink.set_should_fail(true);
    let emitter = emitter_over(
        Arc::new(MemoryStorage::new()),
        Arc::new(sink.clone()),
        fixtures::IPHONE_UA,
    );

    emitter.log_event("photoCapture", Some("A")).await;
    emitter.flush().await;

    assert_eq!(sink.event_count(), 0);
}

/// Events posted over HTTP land in the server's log
#[tokio::test]
async fn test_http_sink_round_trip() {
    let store = Arc::new(MemoryLogStore::with_filters(fixtures::catalog()));
    let app = router(AppState::shared(store.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = EmitterConfig {
        endpoint: format!("http://{}/logs", addr),
        ..EmitterConfig::default()
    };
    let sink = Arc::new(HttpLogSink::new(&config).unwrap());
    let emitter = emitter_over(Arc::new(MemoryStorage::new()), sink, fixtures::DESKTOP_UA);

    emitter.log_event("shareOpened", Some("C")).await;
    emitter.log_event("shareOpened", Some("C")).await;
    emitter.flush().await;

    assert_eq!(store.share_opened_count("C").await.unwrap(), 2);
    let devices = store.device_distribution("C").await.unwrap();
    assert_eq!((devices.mobile, devices.desktop), (0, 1));
}
