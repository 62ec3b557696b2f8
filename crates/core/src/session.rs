//! Session summary and its upsert-merge rule.
//!
//! One record exists per `session_id`. The first event opens it; every
//! later event folds into it with [`SessionRecord::apply`]. The SQL upsert
//! in the Postgres store is the same rule expressed as one statement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::NewEvent;

/// Per-session summary derived from the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Timestamp of the first event processed for the session
    pub start_time: Option<DateTime<Utc>>,
    /// Timestamp of the most recently *processed* event, not the latest one
    pub end_time: Option<DateTime<Utc>>,
    pub page_views: i64,
    /// First non-null user agent seen, never overwritten once set
    pub user_agent: Option<String>,
}

impl SessionRecord {
    /// Creates the record for a session's first event.
    pub fn open(event: &NewEvent, user_agent: Option<&str>) -> Self {
        Self {
            session_id: event.session_id.clone(),
            start_time: Some(event.timestamp),
            end_time: None,
            page_views: i64::from(event.is_pageview()),
            user_agent: user_agent.map(str::to_string),
        }
    }

    /// Folds a subsequent event into the record.
    ///
    /// `end_time` is overwritten unconditionally, so a late-arriving older
    /// event moves it backward.
    pub fn apply(&mut self, event: &NewEvent, user_agent: Option<&str>) {
        self.end_time = Some(event.timestamp);
        self.page_views += i64::from(event.is_pageview());
        if self.user_agent.is_none() {
            self.user_agent = user_agent.map(str::to_string);
        }
    }

    /// Session length in seconds, when the session has progressed forward.
    pub fn duration_secs(&self) -> Option<f64> {
        let (start, end) = (self.start_time?, self.end_time?);
        if end <= start {
            return None;
        }
        Some((end - start).num_microseconds()? as f64 / 1_000_000.0)
    }
}
