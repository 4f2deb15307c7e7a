//! # Board Ordering (server)
//!
//! Authoritative order assignment for kanban scopes, with every mutation
//! executed inside a single repository transaction.
//!
//! ## Architecture
//!
//! - **Domain**: commands, plans, errors, the contiguity invariant and the
//!   pure [`OrderAssignmentService`]
//! - **Ports**: Inbound ([`BoardOrderingApi`]) and Outbound
//!   ([`OrderingRepository`], [`ScopeTransaction`])
//! - **Application**: [`TransactionalReorderExecutor`],
//!   [`BulkUpdateCoordinator`] and the [`BoardOrderingService`] facade
//! - **Adapters**: in-memory and SQLite repositories
//! - **IPC**: [`BoardOrderingHandler`] translating wire payloads
//!
//! ## Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Contiguity | Orders in a scope of n items are exactly `0..n-1` |
//! | 2 | Ownership | Every read and write is filtered by owner; a miss is NotFound |
//! | 3 | Atomicity | A failed call leaves no partial write behind |

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::{InMemoryOrderingRepository, SqliteOrderingRepository};
pub use application::{BoardOrderingService, BulkUpdateCoordinator, TransactionalReorderExecutor};
pub use config::OrderingConfig;
pub use domain::assignment::OrderAssignmentService;
pub use domain::entities::*;
pub use domain::errors::{BulkFailure, ReorderError, StoreError};
pub use ipc::BoardOrderingHandler;
pub use ports::inbound::BoardOrderingApi;
pub use ports::outbound::{OrderingRepository, ScopeTransaction};
