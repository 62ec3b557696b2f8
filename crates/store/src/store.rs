//! Storage abstraction shared by the Postgres and in-memory backends.

use async_trait::async_trait;
use pixel_core::{ClickTargetCount, NewEvent, PageCount, Result, SessionRecord};

/// Event Store plus Session Aggregator, written together per event.
///
/// Implementations must apply a batch all-or-nothing: either every event is
/// appended and folded into its session, or nothing from the batch is kept.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Appends each event and upserts its session, in slice order.
    /// Returns the number of events stored.
    async fn ingest(&self, events: &[NewEvent], user_agent: Option<&str>) -> Result<usize>;

    async fn count_sessions(&self) -> Result<u64>;

    async fn count_events(&self) -> Result<u64>;

    /// Most viewed URLs among `pageview` events.
    async fn top_pages(&self, limit: usize) -> Result<Vec<PageCount>>;

    /// Most clicked `metadata.target` values among `click` events.
    async fn top_click_targets(&self, limit: usize) -> Result<Vec<ClickTargetCount>>;

    /// Mean forward-progressing session length in seconds, `0.0` if none.
    async fn avg_session_duration(&self) -> Result<f64>;

    async fn session(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> bool;
}
