//! Batch delivery to the ingestion endpoint.

use async_trait::async_trait;
use pixel_core::RawEvent;
use tracing::debug;

use crate::config::BeaconConfig;
use crate::error::{BeaconError, Result};

/// Sends one batch. Only success or failure matters; response bodies are ignored.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, batch: &[RawEvent]) -> Result<()>;
}

/// JSON `POST` of the batch array over reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &BeaconConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, batch: &[RawEvent]) -> Result<()> {
        let response = self.client.post(&self.endpoint).json(batch).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BeaconError::Status(status.as_u16()));
        }

        debug!(count = batch.len(), endpoint = %self.endpoint, "Delivered batch");
        Ok(())
    }
}
