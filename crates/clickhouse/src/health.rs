//! ClickHouse health checks and schema bootstrap.

use crate::client::ClickHouseClient;
use analytics_core::{Error, Result};
use tracing::{debug, error, info};

/// Check ClickHouse connection health.
pub async fn check_connection(client: &ClickHouseClient) -> bool {
    match client.inner().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => {
            debug!("ClickHouse connection healthy");
            true
        }
        Err(e) => {
            error!("ClickHouse health check failed: {}", e);
            false
        }
    }
}

/// Create the database and tables if they do not exist.
///
/// Runs against the `default` database since the target may not exist yet.
pub async fn init_schema(client: &ClickHouseClient) -> Result<()> {
    use crate::schema::all_tables;

    let admin = client.admin();
    for ddl in all_tables(&client.config().database) {
        admin
            .query(&ddl)
            .execute()
            .await
            .map_err(|e| Error::internal(format!("Failed to execute DDL: {}", e)))?;
    }

    info!(database = %client.config().database, "ClickHouse schema initialized");
    Ok(())
}
