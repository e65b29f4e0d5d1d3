//! Calendar periods for time-bucketed usage.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bucket granularity for period queries.
///
/// Buckets are computed in UTC. Labels sort lexicographically in
/// chronological order:
/// - daily: `2024-05-01`
/// - weekly (ISO 8601): `2024-W18`
/// - monthly: `2024-05`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parses a period parameter; unrecognized or missing values fall back to daily.
    pub fn parse_or_daily(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Returns the bucket label containing `timestamp`.
    pub fn bucket(&self, timestamp: DateTime<Utc>) -> String {
        match self {
            Self::Daily => timestamp.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let week = timestamp.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => timestamp.format("%Y-%m").to_string(),
        }
    }
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
