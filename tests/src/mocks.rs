//! Mock implementations for testing.

use async_trait::async_trait;
use event_store::AnalyticsStore;
use parking_lot::Mutex;
use pixel_core::{
    ClickTargetCount, DbErrorCode, Error, NewEvent, PageCount, Result, SessionRecord,
};

/// Store whose every operation fails, as if the database were unreachable.
///
/// Records the batch sizes it was asked to store so tests can tell whether
/// the handler reached storage at all.
#[derive(Default)]
pub struct FailingStore {
    attempts: Mutex<Vec<usize>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch sizes passed to `ingest`, in call order.
    pub fn attempts(&self) -> Vec<usize> {
        self.attempts.lock().clone()
    }

    fn query_failed<T>() -> Result<T> {
        Err(Error::database(
            DbErrorCode::QueryFailed,
            "connection refused",
        ))
    }
}

#[async_trait]
impl AnalyticsStore for FailingStore {
    async fn ingest(&self, events: &[NewEvent], _user_agent: Option<&str>) -> Result<usize> {
        self.attempts.lock().push(events.len());
        Err(Error::database(
            DbErrorCode::StoreFailed,
            "connection refused",
        ))
    }

    async fn count_sessions(&self) -> Result<u64> {
        Self::query_failed()
    }

    async fn count_events(&self) -> Result<u64> {
        Self::query_failed()
    }

    async fn top_pages(&self, _limit: usize) -> Result<Vec<PageCount>> {
        Self::query_failed()
    }

    async fn top_click_targets(&self, _limit: usize) -> Result<Vec<ClickTargetCount>> {
        Self::query_failed()
    }

    async fn avg_session_duration(&self) -> Result<f64> {
        Self::query_failed()
    }

    async fn session(&self, _session_id: &str) -> Result<Option<SessionRecord>> {
        Self::query_failed()
    }

    async fn ping(&self) -> bool {
        false
    }
}
