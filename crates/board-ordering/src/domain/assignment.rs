//! Order assignment
//!
//! Computes the slot a moved or created item takes and the sibling shifts
//! that keep its scope contiguous. Insertion at `k` into a scope of `n`
//! pushes every sibling at or after `k` down one slot; append is `k = n`.
//! Planning is pure; only [`OrderAssignmentService::resolve_scope`] and
//! [`OrderAssignmentService::assign`] read through a transaction.

use super::entities::{InsertPlan, OrderShift, Position};
use super::errors::ReorderError;
use crate::ports::outbound::ScopeTransaction;
use board_types::{ContainerRef, ItemId, ItemKind, ItemRecord, OwnerId, ScopeKey};
use tracing::debug;

/// Containers nest at most Project → Group → Task.
const MAX_CHAIN_DEPTH: usize = 4;

#[derive(Clone, Copy, Debug, Default)]
pub struct OrderAssignmentService;

impl OrderAssignmentService {
    pub fn new() -> Self {
        Self
    }

    /// Order for a new item appended to `siblings`: `max + 1`, or 0 when empty.
    pub fn append_order(&self, siblings: &[ItemRecord]) -> Result<u32, ReorderError> {
        match siblings.iter().map(|s| s.order).max() {
            None => Ok(0),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| ReorderError::Validation("scope is full".to_string())),
        }
    }

    /// Plan inserting `moving` into a scope currently holding `siblings`
    /// (sorted by order). The moving item is ignored if present, so the same
    /// call serves same-scope reorders and cross-scope moves.
    pub fn plan_insert(
        &self,
        moving: ItemId,
        siblings: &[ItemRecord],
        position: Position,
    ) -> Result<InsertPlan, ReorderError> {
        let others: Vec<&ItemRecord> = siblings.iter().filter(|s| s.id != moving).collect();
        let len = others.len();
        let index = match position {
            Position::Index(index) => index.min(len),
            Position::Append => len,
        };

        let order = to_order(index)?;
        let mut shifts = Vec::new();
        for (slot, sibling) in others.iter().enumerate() {
            let to = to_order(if slot < index { slot } else { slot + 1 })?;
            if sibling.order != to {
                shifts.push(OrderShift {
                    id: sibling.id,
                    from: sibling.order,
                    to,
                });
            }
        }

        Ok(InsertPlan { order, shifts })
    }

    /// Renumber `siblings` (sorted by order) to `0..n-1`, returning only the
    /// rows that change.
    pub fn plan_compaction(&self, siblings: &[ItemRecord]) -> Result<Vec<OrderShift>, ReorderError> {
        let mut shifts = Vec::new();
        for (slot, sibling) in siblings.iter().enumerate() {
            let to = to_order(slot)?;
            if sibling.order != to {
                shifts.push(OrderShift {
                    id: sibling.id,
                    from: sibling.order,
                    to,
                });
            }
        }
        Ok(shifts)
    }

    /// Reject placing an item of `kind` into a scope that cannot hold it.
    pub fn check_admits(&self, kind: ItemKind, scope: &ScopeKey) -> Result<(), ReorderError> {
        if scope.admits(kind) {
            Ok(())
        } else {
            Err(ReorderError::Validation(format!(
                "a {} cannot be placed in scope {}",
                kind, scope
            )))
        }
    }

    /// Walk the container chain of `scope` up to the owner, requiring every
    /// container to exist, be owned by `owner`, and have the expected kind.
    pub fn resolve_scope(
        &self,
        tx: &mut dyn ScopeTransaction,
        owner: OwnerId,
        scope: &ScopeKey,
    ) -> Result<(), ReorderError> {
        let mut container = scope.container;

        for _ in 0..MAX_CHAIN_DEPTH {
            let Some(container_id) = container.item_id() else {
                return match container {
                    ContainerRef::Owner(scope_owner) if scope_owner == owner => Ok(()),
                    _ => Err(ReorderError::scope_not_found(scope)),
                };
            };

            let Some(parent) = tx.load_item(container_id, owner)? else {
                debug!(scope = %scope, container = %container_id, "Container missing or not owned");
                return Err(ReorderError::scope_not_found(scope));
            };
            if Some(parent.kind) != container.expected_kind() {
                return Err(ReorderError::scope_not_found(scope));
            }
            container = parent.scope.container;
        }

        Err(ReorderError::scope_not_found(scope))
    }

    /// Check that `kind` fits `scope` and that the scope's container chain
    /// belongs to `owner`.
    pub fn resolve_target(
        &self,
        tx: &mut dyn ScopeTransaction,
        owner: OwnerId,
        kind: ItemKind,
        scope: &ScopeKey,
    ) -> Result<(), ReorderError> {
        self.check_admits(kind, scope)?;
        self.resolve_scope(tx, owner, scope)
    }

    /// Validate `(target, position, owner)` and plan the insertion of
    /// `moving` (of `kind`) against the scope's current contents.
    pub fn assign(
        &self,
        tx: &mut dyn ScopeTransaction,
        owner: OwnerId,
        kind: ItemKind,
        moving: ItemId,
        target: &ScopeKey,
        position: Position,
    ) -> Result<InsertPlan, ReorderError> {
        self.resolve_target(tx, owner, kind, target)?;
        let siblings = tx.list_scope(target, owner)?;
        self.plan_insert(moving, &siblings, position)
    }
}

fn to_order(slot: usize) -> Result<u32, ReorderError> {
    u32::try_from(slot).map_err(|_| ReorderError::Validation("scope is full".to_string()))
}
