//! # Drag Coordinator
//!
//! ```text
//!            drag_start(item)
//!   Idle ───────────────────────▶ Dragging(item, origin scope, origin index)
//!    ▲                               │  drag_over(target): cross-scope append
//!    │  drag_end / drag_cancel       │  into the target's scope, no network
//!    └───────────────────────────────┘
//! ```
//!
//! Every store mutation happens synchronously inside a callback. The only
//! thing that leaves this module is a [`CommitIntent`] handed to an
//! [`IntentSink`] on a successful drop.
//!
//! A gesture remembers the scope epochs seen at `drag_start`. If a failed
//! commit rolls back a scope the gesture touched, that scope already holds
//! server state and is left alone when the gesture is undone; a drop after
//! such a rollback is cancelled rather than committed.

use crate::error::{DragError, StoreError};
use crate::ports::IntentSink;
use crate::store::{OrderingStore, ScopeEpochs, SharedStore, StoreSnapshot};
use board_types::{ItemId, MoveRequest, ScopeKey};
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        item_id: ItemId,
        origin_scope: ScopeKey,
        origin_index: usize,
    },
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty area of a scope (column or list).
    Scope(ScopeKey),
    /// Another item; resolves to that item's scope and index.
    Item(ItemId),
    Outside,
}

/// A finished drop, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIntent {
    pub item_id: ItemId,
    pub origin_scope: ScopeKey,
    pub final_scope: ScopeKey,
    pub final_index: usize,
    /// Store state at `drag_start`; restored if the commit fails.
    pub snapshot: StoreSnapshot,
    /// Scope epochs at `drag_start`.
    pub epochs: ScopeEpochs,
}

impl CommitIntent {
    /// Scopes whose contents this intent changed, in lock order.
    pub fn scopes(&self) -> Vec<ScopeKey> {
        let scopes: BTreeSet<ScopeKey> = [self.origin_scope, self.final_scope].into();
        scopes.into_iter().collect()
    }

    pub fn to_request(&self) -> MoveRequest {
        MoveRequest::new(self.item_id, self.final_scope, Some(self.final_index))
    }
}

#[derive(Debug)]
pub enum DragOutcome<T> {
    /// A commit was handed to the sink.
    Submitted(T),
    /// Dropped where it started; nothing to commit.
    Unchanged,
    /// Gesture abandoned; the store was restored.
    Cancelled,
}

struct DragSession {
    item_id: ItemId,
    origin_scope: ScopeKey,
    origin_index: usize,
    working_scope: ScopeKey,
    visited: BTreeSet<ScopeKey>,
    snapshot: StoreSnapshot,
    epochs: ScopeEpochs,
}

impl DragSession {
    /// Undo the gesture in every visited scope not rolled back since it
    /// started.
    fn undo(self, store: &mut OrderingStore) {
        let visited: Vec<ScopeKey> = self.visited.into_iter().collect();
        let stale = store.stale_scopes(&self.epochs, &visited);
        let fresh: Vec<ScopeKey> = visited
            .into_iter()
            .filter(|scope| !stale.contains(scope))
            .collect();
        store.restore_scopes(&self.snapshot, &fresh);
    }

    fn overtaken(&self, store: &OrderingStore) -> bool {
        let visited: Vec<ScopeKey> = self.visited.iter().copied().collect();
        !store.stale_scopes(&self.epochs, &visited).is_empty()
    }
}

pub struct DragCoordinator<S: IntentSink> {
    store: SharedStore,
    sink: S,
    session: Option<DragSession>,
}

impl<S: IntentSink> DragCoordinator<S> {
    pub fn new(store: SharedStore, sink: S) -> Self {
        Self {
            store,
            sink,
            session: None,
        }
    }

    pub fn state(&self) -> DragState {
        match &self.session {
            None => DragState::Idle,
            Some(session) => DragState::Dragging {
                item_id: session.item_id,
                origin_scope: session.origin_scope,
                origin_index: session.origin_index,
            },
        }
    }

    /// Begin dragging `item_id`. A drag already in progress is cancelled
    /// first. Fails, staying `Idle`, if the item is not in the store.
    pub fn drag_start(&mut self, item_id: ItemId) -> Result<(), DragError> {
        if self.session.is_some() {
            debug!(item_id = %item_id, "Drag started while dragging, cancelling stale gesture");
            self.drag_cancel();
        }

        let store = self.store.lock();
        let (origin_scope, origin_index) = store
            .position_of(item_id)
            .ok_or(StoreError::UnknownItem(item_id))?;

        self.session = Some(DragSession {
            item_id,
            origin_scope,
            origin_index,
            working_scope: origin_scope,
            visited: [origin_scope].into(),
            snapshot: store.snapshot(),
            epochs: store.epochs(),
        });
        debug!(item_id = %item_id, scope = %origin_scope, index = origin_index, "Drag started");
        Ok(())
    }

    /// Pointer moved over `target`. Entering another scope appends the item
    /// there. Ignored when idle or when the target resolves to nothing.
    pub fn drag_over(&mut self, target: DropTarget) {
        if self.session.is_none() {
            return;
        }
        let Some(scope) = self.resolve(target) else {
            return;
        };
        if let Err(e) = self.enter_scope(scope) {
            warn!(error = %e, "Drag over failed, keeping current position");
        }
    }

    /// Drop on `target`. Returns what happened; always ends in `Idle`.
    pub fn drag_end(&mut self, target: DropTarget) -> Result<DragOutcome<S::Ticket>, DragError> {
        let Some(session) = &self.session else {
            return Err(DragError::NotDragging);
        };
        if session.overtaken(&self.store.lock()) {
            debug!(item_id = %session.item_id, "Scope rolled back during drag, cancelling");
            self.drag_cancel();
            return Ok(DragOutcome::Cancelled);
        }
        let Some(scope) = self.resolve(target) else {
            self.drag_cancel();
            return Ok(DragOutcome::Cancelled);
        };

        if let Err(e) = self.place(scope, target) {
            self.drag_cancel();
            return Err(e);
        }

        let Some(session) = self.session.take() else {
            return Err(DragError::NotDragging);
        };
        let (final_scope, final_index) = self
            .store
            .lock()
            .position_of(session.item_id)
            .ok_or(StoreError::UnknownItem(session.item_id))?;

        if (final_scope, final_index) == (session.origin_scope, session.origin_index) {
            debug!(item_id = %session.item_id, "Dropped at origin");
            return Ok(DragOutcome::Unchanged);
        }

        debug!(
            item_id = %session.item_id,
            scope = %final_scope,
            index = final_index,
            "Dropped, submitting commit"
        );
        let ticket = self.sink.submit(CommitIntent {
            item_id: session.item_id,
            origin_scope: session.origin_scope,
            final_scope,
            final_index,
            snapshot: session.snapshot,
            epochs: session.epochs,
        });
        Ok(DragOutcome::Submitted(ticket))
    }

    /// Abandon the gesture, restoring the scopes it touched. Returns
    /// whether a drag was in progress.
    pub fn drag_cancel(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let item_id = session.item_id;
        session.undo(&mut self.store.lock());
        debug!(item_id = %item_id, "Drag cancelled");
        true
    }

    fn resolve(&self, target: DropTarget) -> Option<ScopeKey> {
        let store = self.store.lock();
        match target {
            DropTarget::Scope(scope) if store.is_loaded(&scope) => Some(scope),
            DropTarget::Item(item) => store.position_of(item).map(|(scope, _)| scope),
            DropTarget::Scope(_) | DropTarget::Outside => None,
        }
    }

    fn enter_scope(&mut self, scope: ScopeKey) -> Result<(), DragError> {
        let session = self.session.as_mut().ok_or(DragError::NotDragging)?;
        if scope == session.working_scope {
            return Ok(());
        }
        self.store
            .lock()
            .move_across_scopes(session.item_id, session.working_scope, scope, None)?;
        session.working_scope = scope;
        session.visited.insert(scope);
        Ok(())
    }

    /// Bring the item into `scope`, then onto the target item's slot.
    fn place(&mut self, scope: ScopeKey, target: DropTarget) -> Result<(), DragError> {
        self.enter_scope(scope)?;
        let DropTarget::Item(sibling) = target else {
            return Ok(());
        };
        let session = self.session.as_ref().ok_or(DragError::NotDragging)?;
        if sibling == session.item_id {
            return Ok(());
        }

        let mut store = self.store.lock();
        let from = store.position_of(session.item_id).map(|(_, index)| index);
        let to = store.position_of(sibling).map(|(_, index)| index);
        if let (Some(from), Some(to)) = (from, to) {
            store.move_within_scope(session.item_id, from, to)?;
        }
        Ok(())
    }
}
