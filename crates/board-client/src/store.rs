//! # Ordering Store
//!
//! Per-scope id sequences the UI renders from. Every operation is local and
//! synchronous. Sequences are `Arc<Vec<ItemId>>` so a snapshot is a map of
//! Arc clones and a write copies only the scope it touches.
//!
//! Each scope also carries an epoch, bumped whenever a failed commit rolls
//! the scope back. A snapshot taken before the bump no longer describes what
//! the server has for that scope and must not be restored there.

use crate::error::StoreError;
use board_types::{ItemId, ScopeKey};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Store shared between the drag coordinator and reconciliation.
pub type SharedStore = Arc<Mutex<OrderingStore>>;

/// Revert epoch of every scope that has been rolled back at least once.
pub type ScopeEpochs = HashMap<ScopeKey, u64>;

/// Render notification for one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    ScopeChanged(ScopeKey),
}

/// Point-in-time copy of every loaded scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    scopes: HashMap<ScopeKey, Arc<Vec<ItemId>>>,
}

impl StoreSnapshot {
    pub fn items(&self, scope: &ScopeKey) -> Option<&[ItemId]> {
        self.scopes.get(scope).map(|ids| ids.as_slice())
    }
}

pub struct OrderingStore {
    scopes: HashMap<ScopeKey, Arc<Vec<ItemId>>>,
    epochs: ScopeEpochs,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for OrderingStore {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl OrderingStore {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            scopes: HashMap::new(),
            epochs: HashMap::new(),
            events,
        }
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Replace a scope with a server listing.
    pub fn load_scope(&mut self, scope: ScopeKey, ids: Vec<ItemId>) {
        self.scopes.insert(scope, Arc::new(ids));
        self.notify(scope);
    }

    pub fn items(&self, scope: &ScopeKey) -> Option<&[ItemId]> {
        self.scopes.get(scope).map(|ids| ids.as_slice())
    }

    /// Scope and index currently holding `item`.
    pub fn position_of(&self, item: ItemId) -> Option<(ScopeKey, usize)> {
        self.scopes.iter().find_map(|(scope, ids)| {
            ids.iter()
                .position(|id| *id == item)
                .map(|index| (*scope, index))
        })
    }

    /// Number of items in a scope; 0 when not loaded.
    pub fn len(&self, scope: &ScopeKey) -> usize {
        self.scopes.get(scope).map_or(0, |ids| ids.len())
    }

    pub fn is_loaded(&self, scope: &ScopeKey) -> bool {
        self.scopes.contains_key(scope)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            scopes: self.scopes.clone(),
        }
    }

    /// Return every scope to its state in `snapshot`. Scopes loaded after
    /// the snapshot are dropped. Only scopes whose contents differ notify.
    pub fn restore(&mut self, snapshot: &StoreSnapshot) {
        let scopes: BTreeSet<ScopeKey> = self
            .scopes
            .keys()
            .chain(snapshot.scopes.keys())
            .copied()
            .collect();
        for scope in scopes {
            self.restore_one(snapshot, scope);
        }
    }

    /// Return only `scopes` to their state in `snapshot`.
    pub fn restore_scopes(&mut self, snapshot: &StoreSnapshot, scopes: &[ScopeKey]) {
        for scope in scopes {
            self.restore_one(snapshot, *scope);
        }
    }

    pub fn epoch(&self, scope: &ScopeKey) -> u64 {
        self.epochs.get(scope).copied().unwrap_or(0)
    }

    pub fn epochs(&self) -> ScopeEpochs {
        self.epochs.clone()
    }

    /// Those of `scopes` rolled back since `captured` was taken.
    pub fn stale_scopes(&self, captured: &ScopeEpochs, scopes: &[ScopeKey]) -> Vec<ScopeKey> {
        scopes
            .iter()
            .filter(|scope| self.epoch(scope) != captured.get(*scope).copied().unwrap_or(0))
            .copied()
            .collect()
    }

    /// Roll `scopes` back to `snapshot` after a failed commit, bumping their
    /// epochs so older snapshots stop applying to them.
    pub fn revert_scopes(&mut self, snapshot: &StoreSnapshot, scopes: &[ScopeKey]) {
        for scope in scopes {
            *self.epochs.entry(*scope).or_insert(0) += 1;
            self.restore_one(snapshot, *scope);
        }
    }

    /// Move `item` from `from` to `to` within the scope holding it.
    /// Returns that scope.
    pub fn move_within_scope(
        &mut self,
        item: ItemId,
        from: usize,
        to: usize,
    ) -> Result<ScopeKey, StoreError> {
        let (scope, _) = self.position_of(item).ok_or(StoreError::UnknownItem(item))?;
        let len = self.len(&scope);

        if from >= len || to >= len {
            return Err(StoreError::IndexOutOfBounds {
                scope,
                index: from.max(to),
                len,
            });
        }
        if self.items(&scope).and_then(|ids| ids.get(from)) != Some(&item) {
            return Err(StoreError::ItemMismatch {
                scope,
                index: from,
                item,
            });
        }
        if from == to {
            return Ok(scope);
        }

        let ids = self.scope_mut(&scope)?;
        let moved = ids.remove(from);
        ids.insert(to, moved);
        self.notify(scope);
        Ok(scope)
    }

    /// Move `item` out of `from` into `to` at `index` (clamped; `None`
    /// appends). Returns the index it landed on.
    pub fn move_across_scopes(
        &mut self,
        item: ItemId,
        from: ScopeKey,
        to: ScopeKey,
        index: Option<usize>,
    ) -> Result<usize, StoreError> {
        let source = self.items(&from).ok_or(StoreError::UnknownScope(from))?;
        let from_index = source
            .iter()
            .position(|id| *id == item)
            .ok_or(StoreError::ItemNotInScope { item, scope: from })?;

        if from == to {
            let last = self.len(&from) - 1;
            let to_index = index.map_or(last, |i| i.min(last));
            self.move_within_scope(item, from_index, to_index)?;
            return Ok(to_index);
        }

        let target_len = self
            .items(&to)
            .map(|ids| ids.len())
            .ok_or(StoreError::UnknownScope(to))?;
        let to_index = index.map_or(target_len, |i| i.min(target_len));

        self.scope_mut(&from)?.remove(from_index);
        self.scope_mut(&to)?.insert(to_index, item);
        self.notify(from);
        self.notify(to);
        Ok(to_index)
    }

    fn scope_mut(&mut self, scope: &ScopeKey) -> Result<&mut Vec<ItemId>, StoreError> {
        self.scopes
            .get_mut(scope)
            .map(Arc::make_mut)
            .ok_or(StoreError::UnknownScope(*scope))
    }

    fn restore_one(&mut self, snapshot: &StoreSnapshot, scope: ScopeKey) {
        let wanted = snapshot.scopes.get(&scope);
        if self.scopes.get(&scope) == wanted {
            return;
        }
        match wanted {
            Some(ids) => {
                self.scopes.insert(scope, ids.clone());
            }
            None => {
                self.scopes.remove(&scope);
            }
        }
        self.notify(scope);
    }

    fn notify(&self, scope: ScopeKey) {
        trace!(scope = %scope, "Scope changed");
        // No subscribers is fine.
        let _ = self.events.send(StoreEvent::ScopeChanged(scope));
    }
}
