//! # Error Types
//!
//! Wire-level error taxonomy shared by server responses and client
//! reconciliation, plus parse errors for the text forms of ids and scopes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed ordering operation.
///
/// `NotFound` never distinguishes "absent" from "owned by someone else".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    /// Optimistic scope version check failed.
    StaleScope,
    /// Persistence aborted; nothing was written.
    TransactionFailure,
    /// Client-observed transport failure, including timeout.
    Network,
}

impl ErrorKind {
    /// Whether the caller sent something the server refused.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::Validation | ErrorKind::StaleScope
        )
    }
}

/// Error as carried in a response payload.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct WireError {
    pub kind: ErrorKind,
    pub message: String,
}

impl WireError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }
}

/// Failure to parse the text form of an id, enum or scope key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown {what}: {value}")]
    UnknownVariant { what: &'static str, value: String },

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("malformed scope key: {0}")]
    MalformedScope(String),
}
