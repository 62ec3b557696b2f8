//! Event type definitions for the ingestion pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::limits::MAX_METADATA_BYTES;

/// Kind of tracked event.
///
/// `pageview` and `click` drive the session and stats rollups; any other
/// non-empty name is accepted and stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Pageview,
    Click,
    Custom(String),
}

impl EventType {
    /// Returns the string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pageview => "pageview",
            Self::Click => "click",
            Self::Custom(name) => name,
        }
    }

    pub fn is_pageview(&self) -> bool {
        matches!(self, Self::Pageview)
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "pageview" => Self::Pageview,
            "click" => Self::Click,
            _ => Self::Custom(name),
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates serialized metadata size.
fn validate_metadata_size(metadata: &Value) -> std::result::Result<(), ValidationError> {
    // Fast path: null/empty
    if metadata.is_null() {
        return Ok(());
    }

    let size = serde_json::to_vec(metadata).map(|v| v.len()).unwrap_or(0);

    if size > MAX_METADATA_BYTES {
        let mut err = ValidationError::new("metadata_too_large");
        err.message = Some(
            format!(
                "metadata {}KB exceeds {}KB limit",
                size / 1024,
                MAX_METADATA_BYTES / 1024
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Event as it travels between beacon and ingestion endpoint.
///
/// Every field is optional on the wire; [`NewEvent::from_raw`] enforces
/// which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RawEvent {
    #[validate(length(max = 128))]
    #[serde(default)]
    pub session_id: Option<String>,

    #[validate(length(max = 64))]
    #[serde(default)]
    pub event_type: Option<String>,

    #[validate(length(max = 2048))]
    #[serde(default)]
    pub url: Option<String>,

    #[validate(length(max = 2048))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,

    /// ISO-8601 client timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Event-type specific key/value data (click carries target, id, text)
    #[validate(custom(function = "validate_metadata_size"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A validated event, ready for the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub session_id: String,
    pub event_type: EventType,
    pub url: String,
    pub referrer: Option<String>,
    /// Client-supplied, neither monotonic nor aligned with the server clock
    pub timestamp: DateTime<Utc>,
    /// Always a JSON object
    pub metadata: Value,
}

impl NewEvent {
    /// Validates a wire event. `received_at` stands in for a missing timestamp.
    pub fn from_raw(raw: RawEvent, received_at: DateTime<Utc>) -> Result<Self> {
        let session_id = required(raw.session_id.as_deref(), "session_id")?;
        let event_type = required(raw.event_type.as_deref(), "event_type")?;
        let url = required(raw.url.as_deref(), "url")?;

        raw.validate()
            .map_err(|e| Error::invalid_format(e.to_string()))?;

        // PostgreSQL text and jsonb cannot hold U+0000.
        for (field, value) in [
            ("session_id", Some(session_id)),
            ("event_type", Some(event_type)),
            ("url", Some(url)),
            ("referrer", raw.referrer.as_deref()),
        ] {
            if value.is_some_and(has_nul) {
                return Err(Error::invalid_format(format!("{} contains a NUL character", field)));
            }
        }
        if raw.metadata.as_ref().is_some_and(json_has_nul) {
            return Err(Error::invalid_format("metadata contains a NUL character"));
        }

        let timestamp = match raw.timestamp.as_deref() {
            None | Some("") => received_at,
            Some(ts) => DateTime::parse_from_rfc3339(ts)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| Error::invalid_format(format!("invalid timestamp '{}': {}", ts, e)))?,
        };

        let metadata = match raw.metadata {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(obj @ Value::Object(_)) => obj,
            Some(_) => return Err(Error::invalid_format("metadata must be a JSON object")),
        };

        Ok(Self {
            session_id: session_id.to_string(),
            event_type: EventType::from(event_type),
            url: url.to_string(),
            referrer: raw.referrer,
            timestamp,
            metadata,
        })
    }

    pub fn is_pageview(&self) -> bool {
        self.event_type.is_pageview()
    }

    /// `metadata.target` as text, the way `metadata->>'target'` renders it.
    pub fn click_target(&self) -> Option<String> {
        match self.metadata.get("target")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::missing_field(field)),
    }
}

fn has_nul(s: &str) -> bool {
    s.contains('\0')
}

fn json_has_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => has_nul(s),
        Value::Array(items) => items.iter().any(json_has_nul),
        Value::Object(map) => map.iter().any(|(k, v)| has_nul(k) || json_has_nul(v)),
        _ => false,
    }
}
