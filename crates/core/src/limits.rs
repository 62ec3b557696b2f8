//! Size limits for the ingestion endpoint.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field limits are duplicated there. Keep both in sync when modifying.

// === Batch Limits ===

/// Maximum batch payload size in bytes (1MB).
pub const MAX_BATCH_SIZE_BYTES: usize = 1024 * 1024;

/// Maximum events per batch.
///
/// A beacon flushing every 2 seconds stays far below this.
pub const MAX_BATCH_EVENTS: usize = 1000;

/// Maximum serialized metadata size in bytes (16KB).
pub const MAX_METADATA_BYTES: usize = 16 * 1024;

// === String Field Limits (chars) ===

/// Session ID max length.
/// Beacon IDs are `sess_` + 9 chars + 13 digit millis.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Event type name max length.
pub const MAX_EVENT_TYPE_LEN: usize = 64;

/// Page URL max length.
pub const MAX_URL_LEN: usize = 2048;

/// Referrer URL max length.
/// Matches HTTP Referer header limit.
pub const MAX_REFERRER_LEN: usize = 2048;

/// Stored user agent max length. Longer headers are truncated, not rejected.
pub const MAX_USER_AGENT_LEN: usize = 512;

// === Aggregation ===

/// Number of rows returned by top-N rollups.
pub const TOP_N_LIMIT: usize = 5;
