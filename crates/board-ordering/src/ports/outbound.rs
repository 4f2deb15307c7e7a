//! Outbound Ports (Driven Ports / SPI)
//!
//! Production: `SqliteOrderingRepository` (adapters/sqlite.rs)
//! Testing: `InMemoryOrderingRepository` (adapters/memory.rs)

use crate::domain::errors::StoreError;
use board_types::{ContainerRef, ItemId, ItemRecord, OwnerId, ScopeKey};

/// Row-level access available inside one transaction.
///
/// Every read and write is filtered by `owner`. Writes return `false` when
/// the filter matched no row.
pub trait ScopeTransaction {
    /// Load an item owned by `owner`.
    fn load_item(&mut self, id: ItemId, owner: OwnerId) -> Result<Option<ItemRecord>, StoreError>;

    /// All items of a scope, sorted by order.
    fn list_scope(&mut self, scope: &ScopeKey, owner: OwnerId)
        -> Result<Vec<ItemRecord>, StoreError>;

    /// All items directly inside `container`, across every column.
    fn list_contained(
        &mut self,
        container: &ContainerRef,
        owner: OwnerId,
    ) -> Result<Vec<ItemRecord>, StoreError>;

    fn insert_item(&mut self, record: &ItemRecord) -> Result<(), StoreError>;

    /// Set the scope and order of an item.
    fn set_position(
        &mut self,
        id: ItemId,
        owner: OwnerId,
        scope: &ScopeKey,
        order: u32,
    ) -> Result<bool, StoreError>;

    /// Persist the patchable fields (title, description, priority) of `record`.
    fn update_fields(&mut self, record: &ItemRecord) -> Result<bool, StoreError>;

    fn delete_item(&mut self, id: ItemId, owner: OwnerId) -> Result<bool, StoreError>;

    /// Current version of a scope; 0 for a scope never written.
    fn scope_version(&mut self, scope: &ScopeKey) -> Result<u64, StoreError>;

    /// Increment and return the version of a scope.
    fn bump_scope_version(&mut self, scope: &ScopeKey) -> Result<u64, StoreError>;
}

/// A store that can run a closure as one atomic transaction.
///
/// ## Atomicity Guarantee (INVARIANT-3)
///
/// `Ok` from the closure commits every write it made. `Err` from the
/// closure, a failed commit, or a panic inside the closure leaves the store
/// exactly as it was before the call.
pub trait OrderingRepository: Send + Sync {
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ScopeTransaction) -> Result<T, E>,
        E: From<StoreError>;
}
