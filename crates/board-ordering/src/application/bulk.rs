//! # Bulk Update Coordinator
//!
//! Applies a batch of field updates in input order inside one transaction.
//! The first failing update aborts the batch and rolls back every update
//! already applied.

use super::reorder::relocate;
use crate::config::OrderingConfig;
use crate::domain::assignment::OrderAssignmentService;
use crate::domain::entities::{normalize_title, Position};
use crate::domain::errors::{BulkFailure, ReorderError};
use crate::ports::outbound::{OrderingRepository, ScopeTransaction};
use board_telemetry::metric_inc;
use board_telemetry::metrics::{BULK_BATCHES, TRANSACTIONS_ROLLED_BACK};
use board_types::{EntityPatch, EntityUpdate, ItemKind, ItemRecord, OwnerId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct BulkUpdateCoordinator<R: OrderingRepository> {
    repo: Arc<R>,
    assigner: OrderAssignmentService,
    config: OrderingConfig,
}

impl<R: OrderingRepository> BulkUpdateCoordinator<R> {
    pub fn new(repo: Arc<R>, config: OrderingConfig) -> Self {
        Self {
            repo,
            assigner: OrderAssignmentService::new(),
            config,
        }
    }

    /// Apply `updates` for `owner`, all or nothing.
    ///
    /// Returns the updated entities in input order, or the id of the first
    /// update that could not be applied.
    pub fn apply_batch(
        &self,
        owner: OwnerId,
        updates: &[EntityUpdate],
    ) -> Result<Vec<ItemRecord>, BulkFailure> {
        self.check_batch_size(updates)?;

        let result: Result<Vec<ItemRecord>, BulkFailure> = self.repo.with_transaction(|tx| {
            for update in updates {
                self.apply_one(tx, owner, update)
                    .map_err(|e| BulkFailure::at(update.id, e))?;
            }

            // Later updates may have compacted earlier rows; report what commits.
            let mut applied = Vec::with_capacity(updates.len());
            for update in updates {
                let record = tx
                    .load_item(update.id, owner)
                    .map_err(|e| BulkFailure::at(update.id, e.into()))?
                    .ok_or_else(|| {
                        BulkFailure::at(update.id, ReorderError::item_not_found(update.id))
                    })?;
                applied.push(record);
            }
            Ok(applied)
        });

        match &result {
            Ok(applied) => {
                metric_inc!(BULK_BATCHES, &["applied"]);
                info!(owner = %owner, updates = applied.len(), "Bulk batch applied");
            }
            Err(failure) => {
                metric_inc!(BULK_BATCHES, &["failed"]);
                if failure.error.kind().is_client_error() {
                    warn!(failing_id = ?failure.failing_id, error = %failure.error, "Bulk batch rejected");
                } else {
                    metric_inc!(TRANSACTIONS_ROLLED_BACK);
                    error!(failing_id = ?failure.failing_id, error = %failure.error, "Bulk batch rolled back");
                }
            }
        }
        result
    }

    fn check_batch_size(&self, updates: &[EntityUpdate]) -> Result<(), BulkFailure> {
        if updates.is_empty() {
            return Err(BulkFailure {
                failing_id: None,
                error: ReorderError::Validation("batch is empty".to_string()),
            });
        }
        if let Some(first_over) = updates.get(self.config.max_batch_size) {
            return Err(BulkFailure::at(
                first_over.id,
                ReorderError::Validation(format!(
                    "batch of {} updates exceeds the limit of {}",
                    updates.len(),
                    self.config.max_batch_size
                )),
            ));
        }
        Ok(())
    }

    fn apply_one(
        &self,
        tx: &mut dyn ScopeTransaction,
        owner: OwnerId,
        update: &EntityUpdate,
    ) -> Result<(), ReorderError> {
        let patch = &update.fields;
        if patch.is_empty() {
            return Err(ReorderError::Validation("update changes no fields".to_string()));
        }

        let mut record = tx
            .load_item(update.id, owner)?
            .ok_or_else(|| ReorderError::item_not_found(update.id))?;

        if patch_touches_fields(patch) {
            if let Some(title) = &patch.title {
                record.title = normalize_title(title, self.config.max_title_len)?;
            }
            if let Some(description) = &patch.description {
                record.description = Some(description.clone()).filter(|d| !d.is_empty());
            }
            if let Some(priority) = patch.priority {
                record.priority = priority;
            }
            if !tx.update_fields(&record)? {
                return Err(ReorderError::item_not_found(update.id));
            }
        }

        if let Some(status) = patch.status {
            if record.kind != ItemKind::Task {
                return Err(ReorderError::Validation(format!(
                    "status applies to tasks, not a {}",
                    record.kind
                )));
            }
            if record.status() != Some(status) {
                let target = record.scope.with_column(status);
                let outcome = relocate(&self.assigner, tx, &record, &target, Position::Append)?;
                debug!(item_id = %record.id, scope = %target, order = outcome.order, "Task changed column");
            }
        }

        Ok(())
    }
}

fn patch_touches_fields(patch: &EntityPatch) -> bool {
    patch.title.is_some() || patch.description.is_some() || patch.priority.is_some()
}
