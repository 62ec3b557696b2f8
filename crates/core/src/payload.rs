//! Ingestion payload parsing.
//!
//! The endpoint accepts exactly one shape: a JSON array of events.
//! Validation is all-or-nothing: the first invalid element rejects the
//! whole batch, so nothing from a malformed request is ever persisted.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::events::{NewEvent, RawEvent};
use crate::schema::{validate_batch_len, validate_batch_size};

/// Parse and validate a batch from the request body.
pub fn parse_batch(bytes: &[u8]) -> Result<Vec<NewEvent>> {
    parse_batch_at(bytes, Utc::now())
}

/// Like [`parse_batch`] with an explicit receive time, used as the
/// timestamp for events that carry none.
pub fn parse_batch_at(bytes: &[u8], received_at: DateTime<Utc>) -> Result<Vec<NewEvent>> {
    validate_batch_size(bytes)?;

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::invalid_format(format!("invalid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(Error::invalid_format(
            "Invalid payload, expected array of events",
        ));
    };

    validate_batch_len(items.len())?;

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let raw: RawEvent = serde_json::from_value(item)
                .map_err(|e| Error::invalid_format(format!("invalid event: {}", e)).at_index(i))?;
            NewEvent::from_raw(raw, received_at).map_err(|e| e.at_index(i))
        })
        .collect()
}
