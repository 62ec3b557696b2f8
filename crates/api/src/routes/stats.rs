//! Dashboard stats endpoint.

use axum::{extract::State, Json};
use event_store::snapshot;
use pixel_core::StatsSnapshot;
use telemetry::health;
use tracing::error;

use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/stats - recomputed on every call.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsSnapshot>, ApiError> {
    let stats = snapshot(state.store.as_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to compute stats");
        health().store.set_unhealthy(e.to_string());
        ApiError::from(e)
    })?;

    health().store.set_healthy();
    Ok(Json(stats))
}
