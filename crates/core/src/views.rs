//! Aggregation view records returned by an `AnalyticsStore`.

use serde::{Deserialize, Serialize};

/// Row count for one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub event_type: String,
    pub count: u64,
}

/// Per-filter usage for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterUsage {
    pub filter: String,
    pub photo_captures: u64,
    pub filter_uses: u64,
    pub total: u64,
}

/// Row count for one calendar bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
    pub period: String,
    pub count: u64,
}

/// Mobile vs desktop open counts for a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceDistribution {
    pub mobile: u64,
    pub desktop: u64,
}

impl DeviceDistribution {
    pub fn total(&self) -> u64 {
        self.mobile + self.desktop
    }
}

/// Distinct users or sessions reached by a catalog filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReach {
    pub filter: String,
    pub name: String,
    pub count: u64,
}

/// A filter in the external catalog, joined at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRecord {
    pub id: String,
    pub name: String,
    /// User who owns the filter
    pub owner: String,
}

impl FilterRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner: owner.into(),
        }
    }
}
