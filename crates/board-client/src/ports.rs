//! Ports for the client: the wire it commits over and the hand-off from
//! the drag state machine.

use crate::drag::CommitIntent;
use crate::error::CommitError;
use async_trait::async_trait;
use board_types::MoveRequest;
use std::sync::Arc;

/// Sends a move to the server and waits for its verdict.
#[async_trait]
pub trait CommitTransport: Send + Sync {
    async fn commit_move(&self, request: MoveRequest) -> Result<(), CommitError>;
}

/// Receives finished drops from a [`DragCoordinator`].
///
/// [`DragCoordinator`]: crate::drag::DragCoordinator
pub trait IntentSink {
    type Ticket;

    fn submit(&self, intent: CommitIntent) -> Self::Ticket;
}

impl<T: IntentSink + ?Sized> IntentSink for Arc<T> {
    type Ticket = T::Ticket;

    fn submit(&self, intent: CommitIntent) -> Self::Ticket {
        (**self).submit(intent)
    }
}
