//! ClickHouse table schemas.
//!
//! - `log_datas`: the append-only event log, one row per LogEvent
//! - `filters`: read-only copy of the filter catalog, joined at query time
//!
//! Timestamps are DateTime64(3, 'UTC') so bucket functions work in UTC.

/// SQL for creating the analytics database.
pub fn create_database(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {database}")
}

/// SQL for creating the event log table.
pub fn create_log_table(database: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {database}.log_datas (
    user String,
    type LowCardinality(String),
    timestamp DateTime64(3, 'UTC'),
    session String,
    filter Nullable(String),

    received_at DateTime DEFAULT now()
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (user, timestamp)
SETTINGS index_granularity = 8192
"#
    )
}

/// SQL for creating the filter catalog table.
pub fn create_filters_table(database: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {database}.filters (
    id String,
    name String,
    owner String
)
ENGINE = MergeTree()
ORDER BY id
"#
    )
}

/// Returns all DDL statements in execution order.
pub fn all_tables(database: &str) -> Vec<String> {
    vec![
        create_database(database),
        create_log_table(database),
        create_filters_table(database),
    ]
}
