//! Commands and plans for ordering operations

use super::errors::ReorderError;
use board_types::{ItemId, ScopeKey};
use serde::{Deserialize, Serialize};

/// Requested slot in a target scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Zero-based index; values past the end are treated as append.
    Index(usize),
    Append,
}

/// A validated move, ready for the executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCommand {
    pub item_id: ItemId,
    pub target: ScopeKey,
    pub position: Position,
    /// Optimistic check on the target scope's version.
    pub expected_version: Option<u64>,
}

impl MoveCommand {
    pub fn new(item_id: ItemId, target: ScopeKey, position: Position) -> Self {
        Self {
            item_id,
            target,
            position,
            expected_version: None,
        }
    }

    pub fn append(item_id: ItemId, target: ScopeKey) -> Self {
        Self::new(item_id, target, Position::Append)
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// One sibling whose order changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderShift {
    pub id: ItemId,
    pub from: u32,
    pub to: u32,
}

/// Result of planning an insertion: the slot the moved item takes and the
/// sibling rows that must change to keep the scope contiguous.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertPlan {
    pub order: u32,
    pub shifts: Vec<OrderShift>,
}

/// What a committed move did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub item_id: ItemId,
    pub scope: ScopeKey,
    pub order: u32,
    pub cross_scope: bool,
    /// Rows written, including the moved item. Zero for a no-op move.
    pub rows_written: usize,
}

/// Trim and bound a title.
pub fn normalize_title(title: &str, max_len: usize) -> Result<String, ReorderError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ReorderError::Validation("title must not be empty".to_string()));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(ReorderError::Validation(format!(
            "title is {} characters, limit is {}",
            len, max_len
        )));
    }
    Ok(trimmed.to_string())
}
