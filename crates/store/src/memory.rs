//! In-process store for local development and fast tests.
//!
//! Selected with `database.url = "memory"`. State lives behind one mutex and
//! a whole batch is applied under a single acquisition, which gives the same
//! all-or-nothing and per-session atomicity as the Postgres transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pixel_core::{
    mean_session_duration, rank_top, ClickTargetCount, NewEvent, PageCount, Result, SessionRecord,
};

use crate::insert::truncate_user_agent;
use crate::store::AnalyticsStore;

/// An appended event with its arrival time.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub event: NewEvent,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    events: Vec<StoredEvent>,
    sessions: HashMap<String, SessionRecord>,
}

/// Mutex-guarded event log and session table.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored event in arrival order.
    pub fn events(&self) -> Vec<StoredEvent> {
        self.state.lock().events.clone()
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn ingest(&self, events: &[NewEvent], user_agent: Option<&str>) -> Result<usize> {
        let user_agent = user_agent.map(truncate_user_agent);
        let received_at = Utc::now();
        let mut state = self.state.lock();

        for event in events {
            state.events.push(StoredEvent {
                event: event.clone(),
                received_at,
            });

            state
                .sessions
                .entry(event.session_id.clone())
                .and_modify(|session| session.apply(event, user_agent))
                .or_insert_with(|| SessionRecord::open(event, user_agent));
        }

        Ok(events.len())
    }

    async fn count_sessions(&self) -> Result<u64> {
        Ok(self.state.lock().sessions.len() as u64)
    }

    async fn count_events(&self) -> Result<u64> {
        Ok(self.state.lock().events.len() as u64)
    }

    async fn top_pages(&self, limit: usize) -> Result<Vec<PageCount>> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for stored in self.state.lock().events.iter() {
            if stored.event.is_pageview() {
                *counts.entry(stored.event.url.clone()).or_default() += 1;
            }
        }

        Ok(rank_top(counts, limit)
            .into_iter()
            .map(|(url, count)| PageCount { url, count })
            .collect())
    }

    async fn top_click_targets(&self, limit: usize) -> Result<Vec<ClickTargetCount>> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for stored in self.state.lock().events.iter() {
            if stored.event.event_type.as_str() != "click" {
                continue;
            }
            if let Some(target) = stored.event.click_target() {
                *counts.entry(target).or_default() += 1;
            }
        }

        Ok(rank_top(counts, limit)
            .into_iter()
            .map(|(target, count)| ClickTargetCount { target, count })
            .collect())
    }

    async fn avg_session_duration(&self) -> Result<f64> {
        Ok(mean_session_duration(self.state.lock().sessions.values()))
    }

    async fn session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.state.lock().sessions.get(session_id).cloned())
    }

    async fn ping(&self) -> bool {
        true
    }
}
