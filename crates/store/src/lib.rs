//! Event store and session aggregator for Pixel analytics.
//!
//! Two backends implement [`AnalyticsStore`]: [`PgStore`] for production and
//! [`MemoryStore`] for local runs and tests. [`open_store`] picks one from
//! the configured URL.

pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod memory;
pub mod query;
pub mod schema;
pub mod stats;
pub mod store;

use std::sync::Arc;

use pixel_core::Result;
use tracing::info;

pub use client::PgStore;
pub use config::DatabaseConfig;
pub use health::{check_connection, init_schema, is_idle_termination};
pub use insert::insert_batch;
pub use memory::MemoryStore;
pub use stats::snapshot;
pub use store::AnalyticsStore;

/// Builds the backend selected by `config.url`.
///
/// For Postgres this also provisions the schema. A schema failure is logged
/// and startup continues; the pool reconnects once the database is back.
pub async fn open_store(config: DatabaseConfig) -> Result<Arc<dyn AnalyticsStore>> {
    if config.is_memory() {
        info!("Using in-memory analytics store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(config)?;
    if let Err(e) = init_schema(&store).await {
        tracing::error!(error = %e, "Failed to initialize database schema");
    }
    Ok(Arc::new(store))
}
