//! Unified error types for the analytics pipeline.
//!
//! Error codes:
//! - VALID_001-003: Validation errors (client-caused, batch rejected wholesale)
//! - DB_001-002: Storage errors (infrastructure-caused)

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Invalid JSON / invalid format
    InvalidFormat,
    /// VALID_002: Batch exceeds size or event-count limits
    BatchTooLarge,
    /// VALID_003: Required field missing or empty
    MissingField,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "VALID_001",
            Self::BatchTooLarge => "VALID_002",
            Self::MissingField => "VALID_003",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Database error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    /// DB_001: Failed to store events
    StoreFailed,
    /// DB_002: Failed to read aggregates
    QueryFailed,
}

impl DbErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreFailed => "DB_001",
            Self::QueryFailed => "DB_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        500
    }
}

/// Unified error type for the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("[{code}] {message}")]
    Validation {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Database error with code.
    #[error("[{code}] {message}")]
    Database {
        code: &'static str,
        message: String,
        http_status: u16,
    },
}

impl Error {
    /// Create a validation error with code.
    pub fn validation(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::Validation {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Shorthand for a `VALID_001` format error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::validation(ValidationErrorCode::InvalidFormat, msg)
    }

    /// Shorthand for a `VALID_003` missing-field error.
    pub fn missing_field(field: &str) -> Self {
        Self::validation(
            ValidationErrorCode::MissingField,
            format!("missing required field: {}", field),
        )
    }

    /// Create a database error.
    pub fn database(code: DbErrorCode, msg: impl Into<String>) -> Self {
        Self::Database {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Prefix a validation message with the offending batch position.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            Self::Validation {
                code,
                message,
                http_status,
            } => Self::Validation {
                code,
                message: format!("event[{}]: {}", index, message),
                http_status,
            },
            other => other,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { http_status, .. } => *http_status,
            Self::Database { http_status, .. } => *http_status,
        }
    }

    /// Get the error code.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Validation { code, .. } => Some(*code),
            Self::Database { code, .. } => Some(*code),
        }
    }

    /// Whether the client caused this error.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status())
    }
}
