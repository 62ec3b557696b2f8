//! HTTP API layer for Pixel analytics.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::{router, CorsConfig};
pub use state::AppState;
