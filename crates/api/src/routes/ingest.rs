//! Ingestion endpoint handler.
//!
//! Accepts a JSON array of events. The batch is validated in full before
//! anything is written, then stored in one all-or-nothing call.

use std::time::Instant;

use axum::{body::Bytes, extract::State, Json};
use pixel_core::parse_batch;
use telemetry::{health, metrics};
use tracing::{debug, error, info, warn};

use crate::extractors::UserAgent;
use crate::response::{ApiError, IngestResponse};
use crate::state::AppState;

/// POST /api/events
pub async fn ingest_handler(
    State(state): State<AppState>,
    UserAgent(user_agent): UserAgent,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let start = Instant::now();
    metrics().batches_received.inc();

    debug!(payload_size = body.len(), "Received event batch");

    let events = parse_batch(&body).map_err(|e| {
        warn!(error = %e, "Rejected event batch");
        metrics().batches_rejected.inc();
        ApiError::from(e)
    })?;

    let count = events.len();
    metrics().events_received.inc_by(count as u64);

    let stored = state
        .store
        .ingest(&events, user_agent.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, count, "Failed to store event batch");
            health().store.set_unhealthy(e.to_string());
            ApiError::from(e)
        })?;

    health().store.set_healthy();
    metrics().events_stored.inc_by(stored as u64);

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().ingest_latency_ms.observe(latency_ms);

    info!(received = stored, latency_ms, "Batch processed");

    Ok(Json(IngestResponse::success(stored)))
}
