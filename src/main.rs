//! Pixel analytics server
//!
//! Receives beacon event batches, stores them with their per-session
//! summaries, and serves dashboard statistics.

use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState, CorsConfig};
use event_store::{open_store, AnalyticsStore, DatabaseConfig};
use telemetry::{health, init_tracing_from_env, metrics};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    database: DatabaseConfig,

    #[serde(default)]
    cors: CorsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorsSection {
    #[serde(default)]
    allowed_origins: Vec<String>,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            allowed_origins: CorsConfig::default().allowed_origins,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            cors: CorsSection::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ requires an explicit crypto provider before any TLS use.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Pixel analytics v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        database = %config.database.redacted_url(),
        origins = ?config.cors.allowed_origins,
        "Loaded configuration"
    );

    let store = open_store(config.database.clone())
        .await
        .context("Failed to create analytics store")?;

    check_health(store.as_ref()).await;

    let cors = config
        .cors
        .allowed_origins
        .iter()
        .fold(CorsConfig { allowed_origins: Vec::new() }, |cors, origin| {
            cors.with_origin(origin.clone())
        });

    let app = router(AppState::new(store), &cors);

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
        batches_received = snapshot.batches_received,
        batches_rejected = snapshot.batches_rejected,
        events_stored = snapshot.events_stored,
        store_errors = snapshot.store_errors,
        stats_queries = snapshot.stats_queries,
        ingest_latency_mean_ms = snapshot.ingest_latency_mean_ms,
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
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("PIXEL")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Conventional deployment variables win over the layered config.
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("Invalid PORT value '{}'", port))?;
    }
    if let Ok(frontend) = std::env::var("FRONTEND_URL") {
        if !config.cors.allowed_origins.contains(&frontend) {
            config.cors.allowed_origins.push(frontend);
        }
    }

    Ok(config)
}

/// Probe the store once at startup so readiness reflects reality.
async fn check_health(store: &dyn AnalyticsStore) {
    if store.ping().await {
        health().store.set_healthy();
        info!("Store connection: healthy");
    } else {
        health().store.set_unhealthy("Connection failed");
        error!("Store connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
