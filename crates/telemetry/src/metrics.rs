//! Internal metrics collection.
//!
//! Process-wide counters for appends, queries, and emitter outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic event counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Count of in-flight work items.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero.
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Upper bounds (ms) of the latency buckets; the last slot holds overflow.
const LATENCY_BOUNDS_MS: [u64; 9] = [1, 2, 5, 10, 25, 50, 100, 500, 2000];

/// Millisecond latency distribution.
#[derive(Debug, Default)]
pub struct Histogram {
    slots: [AtomicU64; LATENCY_BOUNDS_MS.len() + 1],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn observe(&self, ms: u64) {
        let slot = LATENCY_BOUNDS_MS.partition_point(|&bound| bound < ms);
        self.slots[slot].fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.sum.load(Ordering::Relaxed) as f64 / n as f64,
        }
    }

    /// Smallest bucket bound covering at least `q` of the observations.
    /// `None` when empty or when the quantile falls in the overflow slot.
    pub fn quantile_bound(&self, q: f64) -> Option<u64> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        let target = (total as f64 * q).ceil() as u64;
        let mut seen = 0;
        for (slot, bound) in self.slots.iter().zip(LATENCY_BOUNDS_MS) {
            seen += slot.load(Ordering::Relaxed);
            if seen >= target {
                return Some(bound);
            }
        }
        None
    }
}

/// Collected metrics for the analytics service and client emitter.
#[derive(Debug, Default)]
pub struct Metrics {
    // POST /logs
    pub events_appended: Counter,
    pub append_errors: Counter,
    pub events_rejected: Counter,

    // Aggregation views
    pub queries_served: Counter,
    pub query_errors: Counter,

    // Client emitter
    pub events_emitted: Counter,
    pub events_suppressed: Counter,
    pub companion_events: Counter,
    pub pending_companions: Gauge,

    pub append_latency_ms: Histogram,
    pub query_latency_ms: Histogram,
}

/// Point-in-time copy of the metrics, logged on shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_appended: u64,
    pub append_errors: u64,
    pub events_rejected: u64,
    pub queries_served: u64,
    pub query_errors: u64,
    pub events_emitted: u64,
    pub events_suppressed: u64,
    pub companion_events: u64,
    pub pending_companions: u64,
    pub append_latency_mean_ms: f64,
    pub query_latency_mean_ms: f64,
    pub query_latency_p95_ms: Option<u64>,
}

impl Metrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_appended: self.events_appended.get(),
            append_errors: self.append_errors.get(),
            events_rejected: self.events_rejected.get(),
            queries_served: self.queries_served.get(),
            query_errors: self.query_errors.get(),
            events_emitted: self.events_emitted.get(),
            events_suppressed: self.events_suppressed.get(),
            companion_events: self.companion_events.get(),
            pending_companions: self.pending_companions.get(),
            append_latency_mean_ms: self.append_latency_ms.mean(),
            query_latency_mean_ms: self.query_latency_ms.mean(),
            query_latency_p95_ms: self.query_latency_ms.quantile_bound(0.95),
        }
    }
}

static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::default);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
