//! Application state shared across handlers.

use std::sync::Arc;

use event_store::AnalyticsStore;

/// Handles cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Event store and session aggregator backend
    pub store: Arc<dyn AnalyticsStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }
}
