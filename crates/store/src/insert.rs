//! Transactional write path: event append + session upsert.

use std::time::Instant;

use pixel_core::{limits::MAX_USER_AGENT_LEN, DbErrorCode, NewEvent, Result};
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::client::{store_error, PgStore};

const INSERT_EVENT: &str = r#"
INSERT INTO events (session_id, event_type, url, referrer, timestamp, metadata)
VALUES ($1, $2, $3, $4, $5, $6)
"#;

/// One atomic statement per event; concurrent batches for the same
/// session serialize on the row lock instead of racing a read-then-write.
const UPSERT_SESSION: &str = r#"
INSERT INTO sessions (session_id, start_time, end_time, page_views, user_agent)
VALUES ($1, $2, NULL, $3, $4)
ON CONFLICT (session_id) DO UPDATE SET
    end_time = EXCLUDED.start_time,
    page_views = sessions.page_views + EXCLUDED.page_views,
    user_agent = COALESCE(sessions.user_agent, EXCLUDED.user_agent)
"#;

/// Stores a batch inside a single transaction.
///
/// Events are applied in slice order. Any failure drops the transaction,
/// which rolls back every row written for the batch so far.
pub async fn insert_batch(
    store: &PgStore,
    events: &[NewEvent],
    user_agent: Option<&str>,
) -> Result<usize> {
    if events.is_empty() {
        return Ok(0);
    }

    let start = Instant::now();
    let user_agent = user_agent.map(truncate_user_agent);

    let mut tx = store
        .pool()
        .begin()
        .await
        .map_err(|e| store_error(DbErrorCode::StoreFailed, "begin transaction", e))?;

    for event in events {
        insert_event(&mut tx, event).await?;
        upsert_session(&mut tx, event, user_agent).await?;
    }

    tx.commit()
        .await
        .map_err(|e| store_error(DbErrorCode::StoreFailed, "commit transaction", e))?;

    debug!(
        count = events.len(),
        latency_ms = %start.elapsed().as_millis(),
        "Committed event batch"
    );

    Ok(events.len())
}

async fn insert_event(tx: &mut Transaction<'_, Postgres>, event: &NewEvent) -> Result<()> {
    sqlx::query(INSERT_EVENT)
        .bind(&event.session_id)
        .bind(event.event_type.as_str())
        .bind(&event.url)
        .bind(event.referrer.as_deref())
        .bind(event.timestamp)
        .bind(&event.metadata)
        .execute(&mut **tx)
        .await
        .map_err(|e| store_error(DbErrorCode::StoreFailed, "insert event", e))?;
    Ok(())
}

async fn upsert_session(
    tx: &mut Transaction<'_, Postgres>,
    event: &NewEvent,
    user_agent: Option<&str>,
) -> Result<()> {
    sqlx::query(UPSERT_SESSION)
        .bind(&event.session_id)
        .bind(event.timestamp)
        .bind(i64::from(event.is_pageview()))
        .bind(user_agent)
        .execute(&mut **tx)
        .await
        .map_err(|e| store_error(DbErrorCode::StoreFailed, "upsert session", e))?;
    Ok(())
}

/// Cuts an over-long header on a char boundary.
pub(crate) fn truncate_user_agent(user_agent: &str) -> &str {
    match user_agent.char_indices().nth(MAX_USER_AGENT_LEN) {
        Some((idx, _)) => &user_agent[..idx],
        None => user_agent,
    }
}
