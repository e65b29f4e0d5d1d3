//! Filter analytics server
//!
//! Append-only event log for the photo-filter product:
//! - `POST /logs` appends one validated LogEvent
//! - `/analytics/*` serves the aggregation views
//! - ClickHouse in production, an in-memory log for development

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use analytics_core::{FilterRecord, MemoryLogStore};
use api::{router, AppState};
use clickhouse_client::{ClickHouseClient, ClickHouseConfig};
use telemetry::{health, init_tracing, metrics, TracingConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    logging: TracingConfig,

    #[serde(default)]
    storage: StorageConfig,

    #[serde(default)]
    clickhouse: ClickHouseConfig,
}

/// Which store backs the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum Backend {
    #[default]
    Clickhouse,
    Memory,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct StorageConfig {
    #[serde(default)]
    backend: Backend,
    /// Filter catalog seeded into the in-memory backend
    #[serde(default)]
    filters: Vec<FilterRecord>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: TracingConfig::default(),
            storage: StorageConfig::default(),
            clickhouse: ClickHouseConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = load_config()?;

    init_tracing(&config.logging.clone().with_env_overrides());

    info!("Starting filter analytics v{}", env!("CARGO_PKG_VERSION"));

    let state = match config.storage.backend {
        Backend::Clickhouse => {
            let clickhouse = Arc::new(
                ClickHouseClient::new(config.clickhouse.clone())
                    .context("Failed to create ClickHouse client")?,
            );

            if let Err(e) = clickhouse_client::health::init_schema(&clickhouse).await {
                error!("Failed to initialize ClickHouse schema: {}", e);
                // Continue anyway - schema might already exist
            }

            check_health(&clickhouse).await;
            AppState::shared(clickhouse)
        }
        Backend::Memory => {
            warn!("Using in-memory log; events are lost on restart");
            let store = Arc::new(MemoryLogStore::with_filters(config.storage.filters.clone()));
            health().storage.set_healthy();
            AppState::shared(store)
        }
    };

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let snapshot = metrics().snapshot();
    info!(
        events_appended = snapshot.events_appended,
        events_rejected = snapshot.events_rejected,
        queries_served = snapshot.queries_served,
        query_errors = snapshot.query_errors,
        query_latency_p95_ms = ?snapshot.query_latency_p95_ms,
        "Shutdown complete"
    );
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // ANALYTICS__CLICKHOUSE__URL, ANALYTICS__STORAGE__BACKEND, ...
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ANALYTICS")
                .prefix_separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Check storage health on startup.
async fn check_health(clickhouse: &ClickHouseClient) {
    if clickhouse_client::health::check_connection(clickhouse).await {
        health().storage.set_healthy();
        info!("ClickHouse connection: healthy");
    } else {
        health().storage.set_unhealthy("Connection failed");
        error!("ClickHouse connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
