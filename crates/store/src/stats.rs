//! Stats Aggregation Engine.
//!
//! Stateless: every call re-runs the five rollups against the store. The
//! queries run concurrently and are not coordinated with ingestion, so a
//! snapshot taken mid-write may mix pre- and post-batch counts.

use std::time::Instant;

use pixel_core::{limits::TOP_N_LIMIT, Result, StatsSnapshot};
use telemetry::metrics;
use tracing::debug;

use crate::store::AnalyticsStore;

/// Compute a fresh dashboard snapshot.
pub async fn snapshot(store: &dyn AnalyticsStore) -> Result<StatsSnapshot> {
    let start = Instant::now();
    metrics().stats_queries.inc();

    let result = tokio::try_join!(
        store.count_sessions(),
        store.count_events(),
        store.top_click_targets(TOP_N_LIMIT),
        store.top_pages(TOP_N_LIMIT),
        store.avg_session_duration(),
    );
    metrics()
        .stats_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    let (total_sessions, total_events, top_click_targets, top_pages, avg_session_duration) =
        result.inspect_err(|_| metrics().stats_errors.inc())?;

    debug!(
        total_sessions,
        total_events,
        latency_ms = %start.elapsed().as_millis(),
        "Computed stats snapshot"
    );

    Ok(StatsSnapshot {
        total_sessions,
        total_events,
        top_click_targets,
        top_pages,
        avg_session_duration,
    })
}
