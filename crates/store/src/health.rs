//! Database health checks and schema provisioning.

use std::io::ErrorKind;

use pixel_core::{DbErrorCode, Result};
use tracing::{debug, error};

use crate::client::{store_error, PgStore};
use crate::schema::all_tables;

/// SQLSTATE for `admin_shutdown`, sent when the server reaps a connection.
const ADMIN_SHUTDOWN: &str = "57P01";

/// SQLSTATE some hosted poolers report for a terminated idle client.
const INTERNAL_ERROR: &str = "XX000";

/// Whether the error is the server closing an idle connection rather
/// than a genuine connectivity problem.
pub fn is_idle_termination(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some(ADMIN_SHUTDOWN) | Some(INTERNAL_ERROR))
        }
        sqlx::Error::Io(io) => matches!(
            io.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::UnexpectedEof
                | ErrorKind::BrokenPipe
        ),
        _ => false,
    }
}

/// Check PostgreSQL connection health.
pub async fn check_connection(store: &PgStore) -> bool {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(store.pool())
        .await
    {
        Ok(_) => {
            debug!("PostgreSQL connection healthy");
            true
        }
        Err(e) => {
            error!("PostgreSQL health check failed: {}", e);
            false
        }
    }
}

/// Initialize database schema.
pub async fn init_schema(store: &PgStore) -> Result<()> {
    for ddl in all_tables() {
        sqlx::query(ddl)
            .execute(store.pool())
            .await
            .map_err(|e| store_error(DbErrorCode::StoreFailed, "execute DDL", e))?;
    }

    debug!("PostgreSQL schema initialized");
    Ok(())
}
