//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, HealthReport};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - liveness, never touches storage.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// GET /health/ready - probes the store and reports component health.
pub async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    if state.store.ping().await {
        health().store.set_healthy();
    } else {
        health().store.set_unhealthy("store ping failed");
    }

    let status = if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health().report()))
}
