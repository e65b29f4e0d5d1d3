//! Seams between the emitter, the HTTP layer, and the storage backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::events::LogEvent;
use crate::period::Period;
use crate::views::{DeviceDistribution, FilterReach, FilterUsage, PeriodCount, TypeCount};

/// Append-only persistence of log events.
///
/// Each call persists exactly one row or fails as a unit. Failures are
/// returned to the caller; suppression is the emitter's job, not the sink's.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one event.
    async fn append(&self, event: &LogEvent) -> Result<()>;

    /// Check if the sink can currently accept events.
    fn is_healthy(&self) -> bool {
        true
    }
}

/// Read-only analytical views over the log.
///
/// Every operation is an independent query that observes one snapshot of
/// the log. Failures surface as `Error::Database` with `DB_002`.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Row counts grouped by type, optionally for one user. Ordered by count descending.
    async fn usage_by_type(&self, user: Option<&str>) -> Result<Vec<TypeCount>>;

    /// Per-filter photoCapture / filterUsed / total counts for a user, ordered by total descending.
    async fn usage_by_filter(&self, user: &str) -> Result<Vec<FilterUsage>>;

    /// `openLink` counts for a (user, filter) pair bucketed by period, most recent first.
    async fn usage_by_period(
        &self,
        user: &str,
        filter: &str,
        period: Period,
    ) -> Result<Vec<PeriodCount>>;

    /// All rows for a filter bucketed by period, most recent first.
    async fn filter_activity_by_period(
        &self,
        filter: &str,
        period: Period,
    ) -> Result<Vec<PeriodCount>>;

    /// `mobile_open` vs `desktop_open` counts for a filter.
    async fn device_distribution(&self, filter: &str) -> Result<DeviceDistribution>;

    /// Distinct users for every catalog filter, zero included, ordered by count descending.
    async fn unique_users_per_filter(&self) -> Result<Vec<FilterReach>>;

    /// Distinct sessions for every catalog filter owned by `owner`, zero included.
    async fn unique_sessions_per_filter(&self, owner: &str) -> Result<Vec<FilterReach>>;

    /// Number of `shareOpened` rows for a filter.
    async fn share_opened_count(&self, filter: &str) -> Result<u64>;
}
