//! PostgreSQL table schemas.
//!
//! - `events` is append-only; rows are never updated or deleted here
//! - `sessions` holds one row per `session_id`, maintained by upsert
//! - no uniqueness on events: redelivered events become duplicate rows

/// SQL for creating the events table.
pub const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id BIGSERIAL PRIMARY KEY,
    session_id TEXT NOT NULL CHECK (session_id <> ''),
    event_type TEXT NOT NULL CHECK (event_type <> ''),
    url TEXT NOT NULL CHECK (url <> ''),
    referrer TEXT,
    timestamp TIMESTAMPTZ NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    received_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// SQL for creating the sessions table.
pub const CREATE_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    start_time TIMESTAMPTZ,
    end_time TIMESTAMPTZ,
    page_views BIGINT NOT NULL DEFAULT 0 CHECK (page_views >= 0),
    user_agent TEXT
)
"#;

/// Serves the top pages rollup.
pub const CREATE_EVENTS_TYPE_URL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_events_type_url ON events (event_type, url)";

pub const CREATE_EVENTS_SESSION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_events_session ON events (session_id)";

/// Statements in dependency order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_EVENTS_TABLE,
        CREATE_SESSIONS_TABLE,
        CREATE_EVENTS_TYPE_URL_INDEX,
        CREATE_EVENTS_SESSION_INDEX,
    ]
}
