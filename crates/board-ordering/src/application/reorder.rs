//! # Transactional Reorder Executor
//!
//! Every operation here is one call to
//! [`OrderingRepository::with_transaction`]: it re-reads what it needs,
//! validates, writes, and either commits as a whole or leaves no trace.

use crate::config::OrderingConfig;
use crate::domain::assignment::OrderAssignmentService;
use crate::domain::entities::{normalize_title, MoveCommand, MoveOutcome, Position};
use crate::domain::errors::ReorderError;
use crate::ports::outbound::{OrderingRepository, ScopeTransaction};
use board_telemetry::metric_inc;
use board_telemetry::metrics::{MOVES_COMMITTED, MOVES_REJECTED, TRANSACTIONS_ROLLED_BACK};
use board_types::{
    ContainerRef, ItemId, ItemKind, ItemRecord, NewItem, OwnerId, ParentRef, Placement, ScopeKey,
};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct TransactionalReorderExecutor<R: OrderingRepository> {
    repo: Arc<R>,
    assigner: OrderAssignmentService,
    config: OrderingConfig,
}

impl<R: OrderingRepository> TransactionalReorderExecutor<R> {
    pub fn new(repo: Arc<R>, config: OrderingConfig) -> Self {
        Self {
            repo,
            assigner: OrderAssignmentService::new(),
            config,
        }
    }

    /// Move an item to `command.position` of `command.target`.
    pub fn move_item(
        &self,
        owner: OwnerId,
        command: MoveCommand,
    ) -> Result<MoveOutcome, ReorderError> {
        let result: Result<MoveOutcome, ReorderError> = self.repo.with_transaction(|tx| {
            let item = tx
                .load_item(command.item_id, owner)?
                .ok_or_else(|| ReorderError::item_not_found(command.item_id))?;

            if let Some(expected) = command.expected_version {
                // Ownership first, so a foreign scope reads as NotFound.
                self.assigner
                    .resolve_target(tx, owner, item.kind, &command.target)?;
                let actual = tx.scope_version(&command.target)?;
                if actual != expected {
                    return Err(ReorderError::StaleScope {
                        scope: command.target,
                        expected,
                        actual,
                    });
                }
            }

            relocate(&self.assigner, tx, &item, &command.target, command.position)
        });

        match &result {
            Ok(outcome) => {
                metric_inc!(MOVES_COMMITTED);
                info!(
                    item_id = %outcome.item_id,
                    scope = %outcome.scope,
                    order = outcome.order,
                    cross_scope = outcome.cross_scope,
                    rows = outcome.rows_written,
                    "Move committed"
                );
            }
            Err(e) => {
                metric_inc!(MOVES_REJECTED, &[e.label()]);
                log_failure("move", &command.item_id, e);
            }
        }
        result
    }

    /// Create an item at the end of the scope its placement names.
    pub fn create(&self, owner: OwnerId, new_item: NewItem) -> Result<ItemRecord, ReorderError> {
        let title = normalize_title(&new_item.title, self.config.max_title_len)?;
        let kind = new_item.placement.kind();
        let scope = new_item.placement.scope(owner);

        let result: Result<ItemRecord, ReorderError> = self.repo.with_transaction(|tx| {
            self.assigner.resolve_target(tx, owner, kind, &scope)?;
            check_parent_in_project(tx, owner, &new_item.placement, &scope)?;

            let siblings = tx.list_scope(&scope, owner)?;
            let record = ItemRecord {
                id: ItemId::new(),
                owner,
                kind,
                scope,
                order: self.assigner.append_order(&siblings)?,
                title,
                description: new_item.description.clone().filter(|d| !d.is_empty()),
                priority: new_item.priority,
            };
            tx.insert_item(&record)?;
            tx.bump_scope_version(&scope)?;
            Ok(record)
        });

        match &result {
            Ok(record) => info!(
                item_id = %record.id,
                kind = %record.kind,
                scope = %record.scope,
                order = record.order,
                "Item created"
            ),
            Err(e) => log_failure("create", &scope, e),
        }
        result
    }

    /// Delete an item and its whole subtree, then close the gap it left.
    pub fn remove(&self, owner: OwnerId, id: ItemId) -> Result<usize, ReorderError> {
        let result: Result<usize, ReorderError> = self.repo.with_transaction(|tx| {
            let item = tx
                .load_item(id, owner)?
                .ok_or_else(|| ReorderError::item_not_found(id))?;

            let mut deleted = 0;
            for descendant in collect_subtree(tx, &item)? {
                if tx.delete_item(descendant, owner)? {
                    deleted += 1;
                }
            }
            if !tx.delete_item(item.id, owner)? {
                return Err(ReorderError::item_not_found(id));
            }
            deleted += 1;

            compact_scope(&self.assigner, tx, owner, &item.scope)?;
            tx.bump_scope_version(&item.scope)?;
            Ok(deleted)
        });

        match &result {
            Ok(count) => info!(item_id = %id, deleted = count, "Item removed"),
            Err(e) => log_failure("remove", &id, e),
        }
        result
    }

    /// Items of a scope in order, after checking the scope belongs to `owner`.
    pub fn list_scope(
        &self,
        owner: OwnerId,
        scope: &ScopeKey,
    ) -> Result<Vec<ItemRecord>, ReorderError> {
        self.repo.with_transaction(|tx| {
            self.assigner.resolve_scope(tx, owner, scope)?;
            Ok(tx.list_scope(scope, owner)?)
        })
    }
}

/// Place `item` at `position` of `target` and close the gap it leaves in its
/// old scope. Shared by moves and bulk status changes.
pub(crate) fn relocate(
    assigner: &OrderAssignmentService,
    tx: &mut dyn ScopeTransaction,
    item: &ItemRecord,
    target: &ScopeKey,
    position: Position,
) -> Result<MoveOutcome, ReorderError> {
    let owner = item.owner;
    let plan = assigner.assign(tx, owner, item.kind, item.id, target, position)?;
    let cross_scope = item.scope != *target;

    let mut outcome = MoveOutcome {
        item_id: item.id,
        scope: *target,
        order: plan.order,
        cross_scope,
        rows_written: 0,
    };
    if !cross_scope && plan.order == item.order && plan.shifts.is_empty() {
        return Ok(outcome);
    }

    for shift in &plan.shifts {
        if !tx.set_position(shift.id, owner, target, shift.to)? {
            return Err(ReorderError::item_not_found(shift.id));
        }
    }
    if !tx.set_position(item.id, owner, target, plan.order)? {
        return Err(ReorderError::item_not_found(item.id));
    }
    tx.bump_scope_version(target)?;
    outcome.rows_written = plan.shifts.len() + 1;

    if cross_scope {
        outcome.rows_written += compact_scope(assigner, tx, owner, &item.scope)?;
        tx.bump_scope_version(&item.scope)?;
    }
    Ok(outcome)
}

/// Renumber a scope to `0..n-1`. Returns the number of rows rewritten.
pub(crate) fn compact_scope(
    assigner: &OrderAssignmentService,
    tx: &mut dyn ScopeTransaction,
    owner: OwnerId,
    scope: &ScopeKey,
) -> Result<usize, ReorderError> {
    let remaining = tx.list_scope(scope, owner)?;
    let shifts = assigner.plan_compaction(&remaining)?;
    for shift in &shifts {
        if !tx.set_position(shift.id, owner, scope, shift.to)? {
            return Err(ReorderError::item_not_found(shift.id));
        }
    }
    Ok(shifts.len())
}

/// Ids of everything contained in `item`, children before grandchildren.
fn collect_subtree(
    tx: &mut dyn ScopeTransaction,
    item: &ItemRecord,
) -> Result<Vec<ItemId>, ReorderError> {
    let mut pending: Vec<ContainerRef> = ContainerRef::of_item(item.kind, item.id)
        .into_iter()
        .collect();
    let mut found = Vec::new();

    while let Some(container) = pending.pop() {
        for child in tx.list_contained(&container, item.owner)? {
            if let Some(nested) = ContainerRef::of_item(child.kind, child.id) {
                pending.push(nested);
            }
            found.push(child.id);
        }
    }
    Ok(found)
}

/// A group or parent task named by a placement must sit inside the
/// placement's project.
fn check_parent_in_project(
    tx: &mut dyn ScopeTransaction,
    owner: OwnerId,
    placement: &Placement,
    scope: &ScopeKey,
) -> Result<(), ReorderError> {
    let Placement::WorkItem {
        project, parent, ..
    } = *placement
    else {
        return Ok(());
    };

    let parent_id = match parent {
        ParentRef::None => return Ok(()),
        ParentRef::Group(id) | ParentRef::Task(id) => id,
    };
    let mut container = match tx.load_item(parent_id, owner)? {
        Some(record) => record.scope.container,
        None => return Err(ReorderError::scope_not_found(scope)),
    };
    if let ContainerRef::Group(group) = container {
        container = match tx.load_item(group, owner)? {
            Some(record) => record.scope.container,
            None => return Err(ReorderError::scope_not_found(scope)),
        };
    }

    if container == ContainerRef::Project(project) {
        Ok(())
    } else {
        Err(ReorderError::Validation(format!(
            "{} {} is not part of project {}",
            if matches!(parent, ParentRef::Group(_)) {
                ItemKind::TaskGroup
            } else {
                ItemKind::Task
            },
            parent_id,
            project
        )))
    }
}

fn log_failure(operation: &'static str, subject: &dyn fmt::Display, err: &ReorderError) {
    if err.kind().is_client_error() {
        warn!(operation, subject = %subject, error = %err, "Request rejected");
    } else {
        metric_inc!(TRANSACTIONS_ROLLED_BACK);
        error!(operation, subject = %subject, error = %err, "Transaction rolled back");
    }
}
