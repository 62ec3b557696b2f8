//! Read-side aggregation queries.
//!
//! Each query is independent and runs without locks beyond Postgres' own
//! snapshot isolation, so results may trail concurrent ingestion slightly.

use chrono::{DateTime, Utc};
use pixel_core::{ClickTargetCount, DbErrorCode, PageCount, Result, SessionRecord};
use sqlx::FromRow;

use crate::client::{store_error, PgStore};

#[derive(Debug, FromRow)]
struct PageRow {
    url: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct TargetRow {
    target: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct SessionRow {
    session_id: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    page_views: i64,
    user_agent: Option<String>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            start_time: row.start_time,
            end_time: row.end_time,
            page_views: row.page_views,
            user_agent: row.user_agent,
        }
    }
}

/// Count all session rows.
pub async fn count_sessions(store: &PgStore) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(store.pool())
        .await
        .map_err(|e| store_error(DbErrorCode::QueryFailed, "count sessions", e))?;
    Ok(count as u64)
}

/// Count all event rows.
pub async fn count_events(store: &PgStore) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(store.pool())
        .await
        .map_err(|e| store_error(DbErrorCode::QueryFailed, "count events", e))?;
    Ok(count as u64)
}

/// Most viewed URLs; ties broken by URL in byte order.
pub async fn top_pages(store: &PgStore, limit: usize) -> Result<Vec<PageCount>> {
    let rows: Vec<PageRow> = sqlx::query_as(
        r#"
        SELECT url, COUNT(*) AS count
        FROM events
        WHERE event_type = 'pageview'
        GROUP BY url
        ORDER BY count DESC, url COLLATE "C" ASC
        LIMIT $1
        "#,
    )
    .bind(limit as i64)
    .fetch_all(store.pool())
    .await
    .map_err(|e| store_error(DbErrorCode::QueryFailed, "top pages", e))?;

    Ok(rows
        .into_iter()
        .map(|r| PageCount {
            url: r.url,
            count: r.count as u64,
        })
        .collect())
}

/// Most clicked targets; ties broken by target in byte order.
pub async fn top_click_targets(store: &PgStore, limit: usize) -> Result<Vec<ClickTargetCount>> {
    let rows: Vec<TargetRow> = sqlx::query_as(
        r#"
        SELECT metadata->>'target' AS target, COUNT(*) AS count
        FROM events
        WHERE event_type = 'click' AND metadata->>'target' IS NOT NULL
        GROUP BY metadata->>'target'
        ORDER BY count DESC, metadata->>'target' COLLATE "C" ASC
        LIMIT $1
        "#,
    )
    .bind(limit as i64)
    .fetch_all(store.pool())
    .await
    .map_err(|e| store_error(DbErrorCode::QueryFailed, "top click targets", e))?;

    Ok(rows
        .into_iter()
        .map(|r| ClickTargetCount {
            target: r.target,
            count: r.count as u64,
        })
        .collect())
}

/// Mean duration over sessions whose `end_time` is after `start_time`.
pub async fn avg_session_duration(store: &PgStore) -> Result<f64> {
    let avg: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(AVG(EXTRACT(EPOCH FROM (end_time - start_time)))::float8, 0)
        FROM sessions
        WHERE end_time IS NOT NULL AND start_time IS NOT NULL
            AND end_time > start_time
        "#,
    )
    .fetch_one(store.pool())
    .await
    .map_err(|e| store_error(DbErrorCode::QueryFailed, "average session duration", e))?;
    Ok(avg)
}

/// Fetch one session summary.
pub async fn fetch_session(store: &PgStore, session_id: &str) -> Result<Option<SessionRecord>> {
    let row: Option<SessionRow> = sqlx::query_as(
        r#"
        SELECT session_id, start_time, end_time, page_views, user_agent
        FROM sessions
        WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(store.pool())
    .await
    .map_err(|e| store_error(DbErrorCode::QueryFailed, "fetch session", e))?;
    Ok(row.map(SessionRecord::from))
}

/// Count events for one session (test verification).
pub async fn count_session_events(store: &PgStore, session_id: &str) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE session_id = $1")
        .bind(session_id)
        .fetch_one(store.pool())
        .await
        .map_err(|e| store_error(DbErrorCode::QueryFailed, "count session events", e))?;
    Ok(count as u64)
}
