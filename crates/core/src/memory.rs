//! In-memory append-only log.
//!
//! Implements both `LogSink` and `AnalyticsStore` with the same grouping
//! semantics as the ClickHouse queries. Used for development (`memory`
//! backend) and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::error::Result;
use crate::events::{event_types, validate_log_event, LogEvent};
use crate::limits::MAX_PERIOD_BUCKETS;
use crate::period::Period;
use crate::store::{AnalyticsStore, LogSink};
use crate::views::{
    DeviceDistribution, FilterReach, FilterRecord, FilterUsage, PeriodCount, TypeCount,
};

/// Append-only event log plus a read-only filter catalog.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    rows: RwLock<Vec<LogEvent>>,
    filters: RwLock<Vec<FilterRecord>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with a preloaded filter catalog.
    pub fn with_filters(filters: Vec<FilterRecord>) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            filters: RwLock::new(filters),
        }
    }

    /// Adds a filter to the catalog (replacing any filter with the same id).
    pub fn register_filter(&self, filter: FilterRecord) {
        let mut filters = self.filters.write();
        filters.retain(|f| f.id != filter.id);
        filters.push(filter);
    }

    /// Returns a copy of every stored row in append order.
    pub fn rows(&self) -> Vec<LogEvent> {
        self.rows.read().clone()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn bucketed<F>(&self, period: Period, keep: F) -> Vec<PeriodCount>
    where
        F: Fn(&LogEvent) -> bool,
    {
        let rows = self.rows.read();
        let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
        for row in rows.iter().filter(|r| keep(r)) {
            *buckets.entry(period.bucket(row.timestamp)).or_default() += 1;
        }

        buckets
            .into_iter()
            .rev()
            .take(MAX_PERIOD_BUCKETS)
            .map(|(period, count)| PeriodCount { period, count })
            .collect()
    }

    fn reach<F, K>(&self, include: F, key: K) -> Vec<FilterReach>
    where
        F: Fn(&FilterRecord) -> bool,
        K: Fn(&LogEvent) -> &str,
    {
        let rows = self.rows.read();
        let filters = self.filters.read();

        let mut distinct: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for row in rows.iter() {
            if let Some(filter) = row.filter_id() {
                distinct.entry(filter).or_default().insert(key(row));
            }
        }

        let mut result: Vec<FilterReach> = filters
            .iter()
            .filter(|f| include(f))
            .map(|f| FilterReach {
                filter: f.id.clone(),
                name: f.name.clone(),
                count: distinct.get(f.id.as_str()).map_or(0, |s| s.len() as u64),
            })
            .collect();

        result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.filter.cmp(&b.filter)));
        result
    }
}

#[async_trait]
impl LogSink for MemoryLogStore {
    async fn append(&self, event: &LogEvent) -> Result<()> {
        validate_log_event(event)?;
        self.rows.write().push(event.clone());
        debug!(event_type = %event.event_type, "Appended event to memory log");
        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for MemoryLogStore {
    async fn usage_by_type(&self, user: Option<&str>) -> Result<Vec<TypeCount>> {
        let rows = self.rows.read();
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for row in rows.iter().filter(|r| user.map_or(true, |u| r.user == u)) {
            *counts.entry(row.event_type.as_str()).or_default() += 1;
        }

        let mut result: Vec<TypeCount> = counts
            .into_iter()
            .map(|(event_type, count)| TypeCount {
                event_type: event_type.to_string(),
                count,
            })
            .collect();
        result.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.event_type.cmp(&b.event_type))
        });
        Ok(result)
    }

    async fn usage_by_filter(&self, user: &str) -> Result<Vec<FilterUsage>> {
        let rows = self.rows.read();
        let mut usage: HashMap<&str, FilterUsage> = HashMap::new();
        for row in rows.iter().filter(|r| r.user == user) {
            let Some(filter) = row.filter_id() else {
                continue;
            };
            let entry = usage.entry(filter).or_insert_with(|| FilterUsage {
                filter: filter.to_string(),
                photo_captures: 0,
                filter_uses: 0,
                total: 0,
            });
            match row.event_type.as_str() {
                event_types::PHOTO_CAPTURE => entry.photo_captures += 1,
                event_types::FILTER_USED => entry.filter_uses += 1,
                _ => {}
            }
            entry.total += 1;
        }

        let mut result: Vec<FilterUsage> = usage.into_values().collect();
        result.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.filter.cmp(&b.filter)));
        Ok(result)
    }

    async fn usage_by_period(
        &self,
        user: &str,
        filter: &str,
        period: Period,
    ) -> Result<Vec<PeriodCount>> {
        Ok(self.bucketed(period, |r| {
            r.user == user
                && r.filter_id() == Some(filter)
                && r.event_type == event_types::OPEN_LINK
        }))
    }

    async fn filter_activity_by_period(
        &self,
        filter: &str,
        period: Period,
    ) -> Result<Vec<PeriodCount>> {
        Ok(self.bucketed(period, |r| r.filter_id() == Some(filter)))
    }

    async fn device_distribution(&self, filter: &str) -> Result<DeviceDistribution> {
        let rows = self.rows.read();
        let mut dist = DeviceDistribution::default();
        for row in rows.iter().filter(|r| r.filter_id() == Some(filter)) {
            match row.event_type.as_str() {
                event_types::MOBILE_OPEN => dist.mobile += 1,
                event_types::DESKTOP_OPEN => dist.desktop += 1,
                _ => {}
            }
        }
        Ok(dist)
    }

    async fn unique_users_per_filter(&self) -> Result<Vec<FilterReach>> {
        Ok(self.reach(|_| true, |r| r.user.as_str()))
    }

    async fn unique_sessions_per_filter(&self, owner: &str) -> Result<Vec<FilterReach>> {
        Ok(self.reach(|f| f.owner == owner, |r| r.session.as_str()))
    }

    async fn share_opened_count(&self, filter: &str) -> Result<u64> {
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .filter(|r| r.filter_id() == Some(filter) && r.event_type == event_types::SHARE_OPENED)
            .count() as u64)
    }
}
