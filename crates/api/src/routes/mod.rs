//! API routes.

pub mod health;
pub mod ingest;
pub mod stats;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::state::AppState;

/// Origins allowed when nothing else is configured: the dashboard dev
/// server and the API host itself.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Browser origins permitted to call the API with credentials.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl CorsConfig {
    /// Adds an origin unless it is already listed.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        if !self.allowed_origins.contains(&origin) {
            self.allowed_origins.push(origin);
        }
        self
    }

    fn layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

/// Creates the API router.
pub fn router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/api/events", post(ingest::ingest_handler))
        .route("/api/stats", get(stats::stats_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        // Applied innermost-first so the stack is still CORS -> Trace ->
        // Compression; each `Router::layer` boxes the body into axum's
        // `Body`, which satisfies `CorsLayer`'s `ResBody: Default` bound.
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors.layer())
        .with_state(state)
}
