//! # Board Client
//!
//! Optimistic drag-and-drop ordering for a kanban board.
//!
//! - [`OrderingStore`]: per-scope id sequences the UI renders from; purely
//!   local and revertible
//! - [`DragCoordinator`]: `Idle`/`Dragging` state machine mutating the store
//!   as the pointer moves, handing a [`CommitIntent`] off on drop
//! - [`ReconciliationSync`]: sends intents to the server one scope at a time
//!   and restores the pre-drag snapshot when the server says no
//!
//! No store lock is held across an `.await`.

pub mod config;
pub mod drag;
pub mod error;
pub mod ports;
pub mod store;
pub mod sync;

pub use config::SyncConfig;
pub use drag::{CommitIntent, DragCoordinator, DragOutcome, DragState, DropTarget};
pub use error::{CommitError, DragError, StoreError};
pub use ports::{CommitTransport, IntentSink};
pub use store::{OrderingStore, ScopeEpochs, SharedStore, StoreEvent, StoreSnapshot};
pub use sync::{CommitOutcome, ReconciliationSync, SyncNotice};
