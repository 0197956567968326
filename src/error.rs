//! Error types for trino-link.
//!
//! Every failure the protocol engine can surface is a variant of
//! [`TrinoLinkError`]; fallible APIs return the crate-local [`Result`].

use thiserror::Error;

/// Result type for trino-link operations.
pub type Result<T> = std::result::Result<T, TrinoLinkError>;

/// Errors that can occur while executing a statement.
///
/// Clone is derived so a failed cursor can keep returning its first error.
#[derive(Debug, Clone, Error)]
pub enum TrinoLinkError {
    /// No HTTP response was obtained at all (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The engine answered with a non-success status, or reported a query
    /// failure on an otherwise successful page.
    #[error("query failed ({status_code}): {reason}")]
    QueryFailed { status_code: u16, reason: String },

    /// The query was cancelled, either by the engine (`USER_CANCELLED`) or
    /// through a [`CancelToken`](crate::transport::CancelToken).
    #[error("query cancelled")]
    Cancelled,

    /// A wire value did not match the shape its declared column type expects.
    #[error("cannot convert {value} ({wire}) to {target}")]
    Conversion {
        value: String,
        wire: &'static str,
        target: String,
    },

    /// A declared column type has no known converter.
    #[error("type not supported: {0:?}")]
    UnsupportedType(String),

    /// A bound argument has no SQL literal representation.
    #[error("cannot serialize parameter: {0}")]
    Serialization(String),

    /// The statement protocol does not support the requested operation.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TrinoLinkError {
    pub(crate) fn conversion(
        value: impl std::fmt::Display,
        wire: &'static str,
        target: impl Into<String>,
    ) -> Self {
        TrinoLinkError::Conversion {
            value: value.to_string(),
            wire,
            target: target.into(),
        }
    }

    /// `true` for the terminal cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TrinoLinkError::Cancelled)
    }
}

impl From<reqwest::Error> for TrinoLinkError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TrinoLinkError::QueryFailed {
                status_code: status.as_u16(),
                reason: err.to_string(),
            }
        } else {
            TrinoLinkError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TrinoLinkError {
    fn from(err: serde_json::Error) -> Self {
        TrinoLinkError::Network(format!("malformed engine response: {}", err))
    }
}
