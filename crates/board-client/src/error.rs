//! Client error types

use board_types::{ErrorKind, ItemId, MoveResponse, ScopeKey, WireError};
use std::time::Duration;
use thiserror::Error;

/// Local store operation rejected; the store is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("scope {0} is not loaded")]
    UnknownScope(ScopeKey),

    #[error("index {index} out of bounds for scope {scope} of length {len}")]
    IndexOutOfBounds {
        scope: ScopeKey,
        index: usize,
        len: usize,
    },

    #[error("item {item} is not at index {index} of scope {scope}")]
    ItemMismatch {
        scope: ScopeKey,
        index: usize,
        item: ItemId,
    },

    #[error("item {item} is not in scope {scope}")]
    ItemNotInScope { item: ItemId, scope: ScopeKey },

    #[error("item {0} is not in any loaded scope")]
    UnknownItem(ItemId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("no drag in progress")]
    NotDragging,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a commit did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The server answered and refused.
    #[error("rejected: {0}")]
    Rejected(WireError),

    #[error("network failure: {0}")]
    Network(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl CommitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommitError::Rejected(error) => error.kind,
            CommitError::Network(_) | CommitError::Timeout(_) => ErrorKind::Network,
        }
    }

    /// Interpret a server response. A failure without an error body is
    /// treated as a transaction failure.
    pub fn check_response(response: MoveResponse) -> Result<(), CommitError> {
        if response.success {
            return Ok(());
        }
        Err(CommitError::Rejected(response.error.unwrap_or_else(|| {
            WireError::new(ErrorKind::TransactionFailure, "request failed")
        })))
    }
}
