//! Error types for board ordering

use board_types::{ErrorKind, ItemId, ScopeKey, WireError};
use thiserror::Error;

/// Failure inside a repository adapter. Always aborts the transaction.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    CorruptRow(String),

    #[error("injected failure after {0} writes")]
    Injected(usize),
}

/// All errors that can occur while ordering or updating items
#[derive(Debug, Error)]
pub enum ReorderError {
    /// Item or scope absent, or not owned by the caller
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed index, scope or field value
    #[error("validation failed: {0}")]
    Validation(String),

    /// Target scope changed since the version the caller saw
    #[error("scope {scope} is at version {actual}, expected {expected}")]
    StaleScope {
        scope: ScopeKey,
        expected: u64,
        actual: u64,
    },

    /// Persistence aborted; the transaction was rolled back
    #[error("transaction aborted: {0}")]
    Transaction(#[from] StoreError),
}

impl ReorderError {
    pub fn item_not_found(id: ItemId) -> Self {
        ReorderError::NotFound(format!("item {}", id))
    }

    pub fn scope_not_found(scope: &ScopeKey) -> Self {
        ReorderError::NotFound(format!("scope {}", scope))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReorderError::NotFound(_) => ErrorKind::NotFound,
            ReorderError::Validation(_) => ErrorKind::Validation,
            ReorderError::StaleScope { .. } => ErrorKind::StaleScope,
            ReorderError::Transaction(_) => ErrorKind::TransactionFailure,
        }
    }

    /// Label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ReorderError::NotFound(_) => "not_found",
            ReorderError::Validation(_) => "validation",
            ReorderError::StaleScope { .. } => "stale_scope",
            ReorderError::Transaction(_) => "transaction_failure",
        }
    }

    /// Wire form. Transaction failures carry a generic message so the
    /// internal cause never reaches the caller.
    pub fn to_wire(&self) -> WireError {
        let kind = self.kind();
        if kind.is_client_error() {
            WireError::new(kind, self.to_string())
        } else {
            WireError::new(kind, "internal error, nothing was saved")
        }
    }
}

/// First failure of a bulk batch. `failing_id` is `None` when the batch was
/// rejected as a whole or the commit itself failed.
#[derive(Debug, Error)]
#[error("bulk update failed at {failing_id:?}: {error}")]
pub struct BulkFailure {
    pub failing_id: Option<ItemId>,
    #[source]
    pub error: ReorderError,
}

impl BulkFailure {
    pub fn at(failing_id: ItemId, error: ReorderError) -> Self {
        Self {
            failing_id: Some(failing_id),
            error,
        }
    }
}

impl From<StoreError> for BulkFailure {
    fn from(err: StoreError) -> Self {
        Self {
            failing_id: None,
            error: ReorderError::Transaction(err),
        }
    }
}
