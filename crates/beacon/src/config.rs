//! Beacon configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default ingestion endpoint for a locally running server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/events";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Ingestion URL batches are POSTed to
    pub endpoint: String,
    /// Period of the background flush
    pub flush_interval_ms: u64,
    /// Per-request timeout for the HTTP transport
    pub request_timeout_ms: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            flush_interval_ms: 2000,
            request_timeout_ms: 5000,
        }
    }
}

impl BeaconConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
