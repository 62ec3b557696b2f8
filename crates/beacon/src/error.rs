//! Delivery errors. These never leave the beacon; they are logged and the
//! batch is dropped.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint responded with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
