//! # Board Ordering Service
//!
//! Facade implementing [`BoardOrderingApi`] over one repository shared by
//! the reorder executor and the bulk coordinator.

use super::bulk::BulkUpdateCoordinator;
use super::reorder::TransactionalReorderExecutor;
use crate::config::OrderingConfig;
use crate::domain::entities::{MoveCommand, MoveOutcome};
use crate::domain::errors::{BulkFailure, ReorderError};
use crate::ports::inbound::BoardOrderingApi;
use crate::ports::outbound::OrderingRepository;
use board_types::{EntityUpdate, ItemId, ItemRecord, NewItem, OwnerId, ScopeKey};
use std::sync::Arc;

pub struct BoardOrderingService<R: OrderingRepository> {
    executor: TransactionalReorderExecutor<R>,
    bulk: BulkUpdateCoordinator<R>,
}

impl<R: OrderingRepository> BoardOrderingService<R> {
    pub fn new(repo: Arc<R>, config: OrderingConfig) -> Self {
        Self {
            executor: TransactionalReorderExecutor::new(repo.clone(), config.clone()),
            bulk: BulkUpdateCoordinator::new(repo, config),
        }
    }
}

impl<R: OrderingRepository> BoardOrderingApi for BoardOrderingService<R> {
    fn move_item(&self, owner: OwnerId, command: MoveCommand) -> Result<MoveOutcome, ReorderError> {
        self.executor.move_item(owner, command)
    }

    fn create_item(&self, owner: OwnerId, item: NewItem) -> Result<ItemRecord, ReorderError> {
        self.executor.create(owner, item)
    }

    fn remove_item(&self, owner: OwnerId, id: ItemId) -> Result<usize, ReorderError> {
        self.executor.remove(owner, id)
    }

    fn list_scope(&self, owner: OwnerId, scope: &ScopeKey) -> Result<Vec<ItemRecord>, ReorderError> {
        self.executor.list_scope(owner, scope)
    }

    fn apply_batch(
        &self,
        owner: OwnerId,
        updates: &[EntityUpdate],
    ) -> Result<Vec<ItemRecord>, BulkFailure> {
        self.bulk.apply_batch(owner, updates)
    }
}
