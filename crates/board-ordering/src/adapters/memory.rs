use crate::domain::errors::StoreError;
use crate::ports::outbound::{OrderingRepository, ScopeTransaction};
use board_types::{ContainerRef, ItemId, ItemRecord, OwnerId, ScopeKey};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Clone, Default)]
struct MemoryState {
    items: HashMap<ItemId, ItemRecord>,
    versions: HashMap<ScopeKey, u64>,
}

/// In-memory ordering repository for unit tests.
///
/// A transaction works on a private copy of the whole state, taken while
/// holding the store mutex, and swaps it in only on `Ok`. Transactions are
/// therefore fully serialized, and an `Err` or a panic discards every write.
/// Production uses `SqliteOrderingRepository`.
#[derive(Default)]
pub struct InMemoryOrderingRepository {
    state: Mutex<MemoryState>,
    fail_after_writes: Mutex<Option<usize>>,
}

impl InMemoryOrderingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next transaction fail on its write number `writes + 1`.
    pub fn inject_failure_after(&self, writes: usize) {
        *self.fail_after_writes.lock() = Some(writes);
    }

    /// Every stored item, sorted by scope and order.
    pub fn dump(&self) -> Vec<ItemRecord> {
        let state = self.state.lock();
        let mut items: Vec<ItemRecord> = state.items.values().cloned().collect();
        items.sort_by(|a, b| (a.scope, a.order, a.id).cmp(&(b.scope, b.order, b.id)));
        items
    }
}

impl OrderingRepository for InMemoryOrderingRepository {
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ScopeTransaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut committed = self.state.lock();
        let mut tx = MemoryTransaction {
            working: committed.clone(),
            writes: 0,
            fail_after: self.fail_after_writes.lock().take(),
        };

        let value = f(&mut tx)?;
        *committed = tx.working;
        Ok(value)
    }
}

struct MemoryTransaction {
    working: MemoryState,
    writes: usize,
    fail_after: Option<usize>,
}

impl MemoryTransaction {
    fn record_write(&mut self) -> Result<(), StoreError> {
        if self.fail_after == Some(self.writes) {
            return Err(StoreError::Injected(self.writes));
        }
        self.writes += 1;
        Ok(())
    }

    fn owned_mut(&mut self, id: ItemId, owner: OwnerId) -> Option<&mut ItemRecord> {
        self.working
            .items
            .get_mut(&id)
            .filter(|record| record.owner == owner)
    }
}

impl ScopeTransaction for MemoryTransaction {
    fn load_item(&mut self, id: ItemId, owner: OwnerId) -> Result<Option<ItemRecord>, StoreError> {
        Ok(self
            .working
            .items
            .get(&id)
            .filter(|record| record.owner == owner)
            .cloned())
    }

    fn list_scope(
        &mut self,
        scope: &ScopeKey,
        owner: OwnerId,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut items: Vec<ItemRecord> = self
            .working
            .items
            .values()
            .filter(|record| record.scope == *scope && record.owner == owner)
            .cloned()
            .collect();
        items.sort_by_key(|record| (record.order, record.id));
        Ok(items)
    }

    fn list_contained(
        &mut self,
        container: &ContainerRef,
        owner: OwnerId,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut items: Vec<ItemRecord> = self
            .working
            .items
            .values()
            .filter(|record| record.scope.container == *container && record.owner == owner)
            .cloned()
            .collect();
        items.sort_by_key(|record| (record.scope, record.order));
        Ok(items)
    }

    fn insert_item(&mut self, record: &ItemRecord) -> Result<(), StoreError> {
        self.record_write()?;
        self.working.items.insert(record.id, record.clone());
        Ok(())
    }

    fn set_position(
        &mut self,
        id: ItemId,
        owner: OwnerId,
        scope: &ScopeKey,
        order: u32,
    ) -> Result<bool, StoreError> {
        self.record_write()?;
        match self.owned_mut(id, owner) {
            Some(record) => {
                record.scope = *scope;
                record.order = order;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_fields(&mut self, record: &ItemRecord) -> Result<bool, StoreError> {
        self.record_write()?;
        match self.owned_mut(record.id, record.owner) {
            Some(stored) => {
                stored.title = record.title.clone();
                stored.description = record.description.clone();
                stored.priority = record.priority;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_item(&mut self, id: ItemId, owner: OwnerId) -> Result<bool, StoreError> {
        self.record_write()?;
        if self.owned_mut(id, owner).is_none() {
            return Ok(false);
        }
        Ok(self.working.items.remove(&id).is_some())
    }

    fn scope_version(&mut self, scope: &ScopeKey) -> Result<u64, StoreError> {
        Ok(self.working.versions.get(scope).copied().unwrap_or(0))
    }

    fn bump_scope_version(&mut self, scope: &ScopeKey) -> Result<u64, StoreError> {
        self.record_write()?;
        let version = self.working.versions.entry(*scope).or_insert(0);
        *version += 1;
        Ok(*version)
    }
}
