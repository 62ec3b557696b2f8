//! PostgreSQL connection pool.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use pixel_core::{
    ClickTargetCount, DbErrorCode, Error, NewEvent, PageCount, Result, SessionRecord,
};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use telemetry::metrics;
use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;
use crate::health::{check_connection, is_idle_termination};
use crate::insert::insert_batch;
use crate::query;
use crate::store::AnalyticsStore;

/// PostgreSQL-backed store with a bounded connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    config: DatabaseConfig,
}

impl PgStore {
    /// Creates the pool. Connections are opened lazily, so an unreachable
    /// database does not prevent startup.
    pub fn connect(config: DatabaseConfig) -> Result<Self> {
        let ssl_mode = PgSslMode::from_str(&config.ssl_mode).map_err(|e| {
            Error::database(
                DbErrorCode::StoreFailed,
                format!("invalid ssl_mode '{}': {}", config.ssl_mode, e),
            )
        })?;

        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| {
                Error::database(DbErrorCode::StoreFailed, format!("invalid database url: {}", e))
            })?
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
            // Idle connections the server has terminated are discarded here
            // instead of failing the next query.
            .test_before_acquire(true)
            .after_connect(|_conn, _meta| {
                Box::pin(async move {
                    debug!("Connected to the PostgreSQL database");
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            idle_timeout_secs = config.idle_timeout_secs,
            connect_timeout_ms = config.connect_timeout_ms,
            "Created PostgreSQL pool"
        );

        Ok(Self { pool, config })
    }

    /// Wraps an existing pool (tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            config: DatabaseConfig::default(),
        }
    }

    /// Returns the inner pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// Converts a driver error, logging idle-connection terminations below error level.
pub(crate) fn store_error(code: DbErrorCode, context: &'static str, err: sqlx::Error) -> Error {
    metrics().store_errors.inc();
    if is_idle_termination(&err) {
        warn!(error = %err, context, "Database connection terminated by server");
    } else {
        error!(error = %err, context, "Database operation failed");
    }
    Error::database(code, format!("{}: {}", context, err))
}

#[async_trait]
impl AnalyticsStore for PgStore {
    async fn ingest(&self, events: &[NewEvent], user_agent: Option<&str>) -> Result<usize> {
        insert_batch(self, events, user_agent).await
    }

    async fn count_sessions(&self) -> Result<u64> {
        query::count_sessions(self).await
    }

    async fn count_events(&self) -> Result<u64> {
        query::count_events(self).await
    }

    async fn top_pages(&self, limit: usize) -> Result<Vec<PageCount>> {
        query::top_pages(self, limit).await
    }

    async fn top_click_targets(&self, limit: usize) -> Result<Vec<ClickTargetCount>> {
        query::top_click_targets(self, limit).await
    }

    async fn avg_session_duration(&self) -> Result<f64> {
        query::avg_session_duration(self).await
    }

    async fn session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        query::fetch_session(self, session_id).await
    }

    async fn ping(&self) -> bool {
        check_connection(self).await
    }
}
