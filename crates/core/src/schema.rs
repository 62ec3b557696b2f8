//! Batch-level limits checked before and after deserialization.

use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::{MAX_BATCH_EVENTS, MAX_BATCH_SIZE_BYTES};

/// Validates raw batch size BEFORE deserialization.
///
/// Call this first to prevent allocation attacks from oversized payloads.
pub fn validate_batch_size(raw_bytes: &[u8]) -> Result<()> {
    if raw_bytes.len() > MAX_BATCH_SIZE_BYTES {
        return Err(Error::validation(
            ValidationErrorCode::BatchTooLarge,
            format!(
                "payload size {}KB exceeds {}KB limit",
                raw_bytes.len() / 1024,
                MAX_BATCH_SIZE_BYTES / 1024
            ),
        ));
    }
    Ok(())
}

/// Validates the number of events in a batch.
pub fn validate_batch_len(len: usize) -> Result<()> {
    if len > MAX_BATCH_EVENTS {
        return Err(Error::validation(
            ValidationErrorCode::BatchTooLarge,
            format!("batch has {} events, exceeds {} limit", len, MAX_BATCH_EVENTS),
        ));
    }
    Ok(())
}
