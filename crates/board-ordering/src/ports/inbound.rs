//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{MoveCommand, MoveOutcome};
use crate::domain::errors::{BulkFailure, ReorderError};
use board_types::{EntityUpdate, ItemId, ItemRecord, NewItem, OwnerId, ScopeKey};

/// Primary ordering API, always called on behalf of an authenticated owner.
pub trait BoardOrderingApi: Send + Sync {
    /// Move an item within its scope or into another scope.
    ///
    /// Runs in one transaction:
    /// 1. Re-validates the item and the target scope chain
    /// 2. Plans the insertion and sibling shifts
    /// 3. Re-compacts the source scope on a cross-scope move
    /// 4. Writes every changed row and commits
    fn move_item(&self, owner: OwnerId, command: MoveCommand) -> Result<MoveOutcome, ReorderError>;

    /// Create an item at the end of its scope.
    fn create_item(&self, owner: OwnerId, item: NewItem) -> Result<ItemRecord, ReorderError>;

    /// Delete an item and everything it contains, then re-compact its scope.
    /// Returns the number of rows deleted.
    fn remove_item(&self, owner: OwnerId, id: ItemId) -> Result<usize, ReorderError>;

    /// Items of a scope in order.
    fn list_scope(&self, owner: OwnerId, scope: &ScopeKey) -> Result<Vec<ItemRecord>, ReorderError>;

    /// Apply field updates in order, all or nothing.
    fn apply_batch(
        &self,
        owner: OwnerId,
        updates: &[EntityUpdate],
    ) -> Result<Vec<ItemRecord>, BulkFailure>;
}
