//! Aggregation queries over the event log.
//!
//! Every query runs as a single statement, so each result observes one
//! snapshot of the table. User-supplied values are always bound with `?`;
//! only the fixed period expressions are spliced into the SQL text.

use crate::client::ClickHouseClient;
use analytics_core::limits::MAX_PERIOD_BUCKETS;
use analytics_core::{
    event_types, AnalyticsStore, DeviceDistribution, Error, FilterReach, FilterUsage, Period,
    PeriodCount, Result, TypeCount,
};
use async_trait::async_trait;
use clickhouse::Row;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

const USAGE_BY_TYPE: &str = "SELECT type, count() AS count FROM log_datas \
     GROUP BY type ORDER BY count DESC, type";

const USAGE_BY_TYPE_FOR_USER: &str = "SELECT type, count() AS count FROM log_datas \
     WHERE user = ? GROUP BY type ORDER BY count DESC, type";

const USAGE_BY_FILTER: &str = "SELECT assumeNotNull(filter) AS filter_id, \
     countIf(type = ?) AS photo_captures, countIf(type = ?) AS filter_uses, count() AS total \
     FROM log_datas WHERE user = ? AND filter IS NOT NULL AND filter != '' \
     GROUP BY filter_id ORDER BY total DESC, filter_id";

const DEVICE_DISTRIBUTION: &str = "SELECT countIf(type = ?) AS mobile, countIf(type = ?) AS desktop \
     FROM log_datas WHERE filter = ?";

const SHARE_OPENED: &str = "SELECT count() FROM log_datas WHERE filter = ? AND type = ?";

/// Distinct users per catalog filter. Filters without rows keep a zero count.
const UNIQUE_USERS: &str = "SELECT f.id, f.name, toUInt64(ifNull(r.reach, 0)) AS count \
     FROM filters AS f \
     LEFT JOIN (SELECT assumeNotNull(filter) AS fid, uniqExact(user) AS reach FROM log_datas \
                WHERE filter IS NOT NULL AND filter != '' GROUP BY fid) AS r ON r.fid = f.id \
     ORDER BY count DESC, f.id";

/// Distinct sessions per catalog filter owned by one user.
const UNIQUE_SESSIONS: &str = "SELECT f.id, f.name, toUInt64(ifNull(r.reach, 0)) AS count \
     FROM filters AS f \
     LEFT JOIN (SELECT assumeNotNull(filter) AS fid, uniqExact(session) AS reach FROM log_datas \
                WHERE filter IS NOT NULL AND filter != '' GROUP BY fid) AS r ON r.fid = f.id \
     WHERE f.owner = ? \
     ORDER BY count DESC, f.id";

/// Bucket label expression for a period, evaluated in UTC.
pub fn period_expr(period: Period) -> &'static str {
    match period {
        Period::Daily => "formatDateTime(timestamp, '%Y-%m-%d')",
        Period::Weekly => {
            "concat(toString(toISOYear(timestamp)), '-W', \
             if(toISOWeek(timestamp) < 10, '0', ''), toString(toISOWeek(timestamp)))"
        }
        Period::Monthly => "formatDateTime(timestamp, '%Y-%m')",
    }
}

/// `openLink` rows for one (user, filter) pair, most recent buckets first.
pub fn usage_by_period_sql(period: Period) -> String {
    format!(
        "SELECT {expr} AS period, count() AS count FROM log_datas \
         WHERE user = ? AND filter = ? AND type = ? \
         GROUP BY period ORDER BY period DESC LIMIT ?",
        expr = period_expr(period)
    )
}

/// Every row for one filter, most recent buckets first.
pub fn filter_activity_sql(period: Period) -> String {
    format!(
        "SELECT {expr} AS period, count() AS count FROM log_datas \
         WHERE filter = ? \
         GROUP BY period ORDER BY period DESC LIMIT ?",
        expr = period_expr(period)
    )
}

#[derive(Debug, Row, Deserialize)]
struct TypeCountRow {
    event_type: String,
    count: u64,
}

#[derive(Debug, Row, Deserialize)]
struct FilterUsageRow {
    filter_id: String,
    photo_captures: u64,
    filter_uses: u64,
    total: u64,
}

#[derive(Debug, Row, Deserialize)]
struct PeriodCountRow {
    period: String,
    count: u64,
}

#[derive(Debug, Row, Deserialize)]
struct DeviceRow {
    mobile: u64,
    desktop: u64,
}

#[derive(Debug, Row, Deserialize)]
struct ReachRow {
    id: String,
    name: String,
    count: u64,
}

impl From<PeriodCountRow> for PeriodCount {
    fn from(row: PeriodCountRow) -> Self {
        Self {
            period: row.period,
            count: row.count,
        }
    }
}

impl From<ReachRow> for FilterReach {
    fn from(row: ReachRow) -> Self {
        Self {
            filter: row.id,
            name: row.name,
            count: row.count,
        }
    }
}

fn query_error(e: clickhouse::error::Error) -> Error {
    Error::query_failed(format!("Query error: {}", e))
}

fn observe(view: &'static str, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!(view, elapsed_ms, "ClickHouse aggregation completed");
}

#[async_trait]
impl AnalyticsStore for ClickHouseClient {
    async fn usage_by_type(&self, user: Option<&str>) -> Result<Vec<TypeCount>> {
        let start = Instant::now();
        let query = match user {
            Some(user) => self.inner().query(USAGE_BY_TYPE_FOR_USER).bind(user),
            None => self.inner().query(USAGE_BY_TYPE),
        };
        let rows: Vec<TypeCountRow> = query.fetch_all().await.map_err(query_error)?;
        observe("usage_by_type", start);

        Ok(rows
            .into_iter()
            .map(|r| TypeCount {
                event_type: r.event_type,
                count: r.count,
            })
            .collect())
    }

    async fn usage_by_filter(&self, user: &str) -> Result<Vec<FilterUsage>> {
        let start = Instant::now();
        let rows: Vec<FilterUsageRow> = self
            .inner()
            .query(USAGE_BY_FILTER)
            .bind(event_types::PHOTO_CAPTURE)
            .bind(event_types::FILTER_USED)
            .bind(user)
            .fetch_all()
            .await
            .map_err(query_error)?;
        observe("usage_by_filter", start);

        Ok(rows
            .into_iter()
            .map(|r| FilterUsage {
                filter: r.filter_id,
                photo_captures: r.photo_captures,
                filter_uses: r.filter_uses,
                total: r.total,
            })
            .collect())
    }

    async fn usage_by_period(
        &self,
        user: &str,
        filter: &str,
        period: Period,
    ) -> Result<Vec<PeriodCount>> {
        let start = Instant::now();
        let rows: Vec<PeriodCountRow> = self
            .inner()
            .query(&usage_by_period_sql(period))
            .bind(user)
            .bind(filter)
            .bind(event_types::OPEN_LINK)
            .bind(MAX_PERIOD_BUCKETS as u32)
            .fetch_all()
            .await
            .map_err(query_error)?;
        observe("usage_by_period", start);

        Ok(rows.into_iter().map(PeriodCount::from).collect())
    }

    async fn filter_activity_by_period(
        &self,
        filter: &str,
        period: Period,
    ) -> Result<Vec<PeriodCount>> {
        let start = Instant::now();
        let rows: Vec<PeriodCountRow> = self
            .inner()
            .query(&filter_activity_sql(period))
            .bind(filter)
            .bind(MAX_PERIOD_BUCKETS as u32)
            .fetch_all()
            .await
            .map_err(query_error)?;
        observe("filter_activity_by_period", start);

        Ok(rows.into_iter().map(PeriodCount::from).collect())
    }

    async fn device_distribution(&self, filter: &str) -> Result<DeviceDistribution> {
        let start = Instant::now();
        let row: DeviceRow = self
            .inner()
            .query(DEVICE_DISTRIBUTION)
            .bind(event_types::MOBILE_OPEN)
            .bind(event_types::DESKTOP_OPEN)
            .bind(filter)
            .fetch_one()
            .await
            .map_err(query_error)?;
        observe("device_distribution", start);

        Ok(DeviceDistribution {
            mobile: row.mobile,
            desktop: row.desktop,
        })
    }

    async fn unique_users_per_filter(&self) -> Result<Vec<FilterReach>> {
        let start = Instant::now();
        let rows: Vec<ReachRow> = self
            .inner()
            .query(UNIQUE_USERS)
            .fetch_all()
            .await
            .map_err(query_error)?;
        observe("unique_users_per_filter", start);

        Ok(rows.into_iter().map(FilterReach::from).collect())
    }

    async fn unique_sessions_per_filter(&self, owner: &str) -> Result<Vec<FilterReach>> {
        let start = Instant::now();
        let rows: Vec<ReachRow> = self
            .inner()
            .query(UNIQUE_SESSIONS)
            .bind(owner)
            .fetch_all()
            .await
            .map_err(query_error)?;
        observe("unique_sessions_per_filter", start);

        Ok(rows.into_iter().map(FilterReach::from).collect())
    }

    async fn share_opened_count(&self, filter: &str) -> Result<u64> {
        let start = Instant::now();
        let count: u64 = self
            .inner()
            .query(SHARE_OPENED)
            .bind(filter)
            .bind(event_types::SHARE_OPENED)
            .fetch_one()
            .await
            .map_err(query_error)?;
        observe("share_opened_count", start);

        Ok(count)
    }
}
