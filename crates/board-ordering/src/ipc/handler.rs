//! Request handlers for the ordering service.
//!
//! Decodes wire payloads into commands, delegates to a [`BoardOrderingApi`],
//! and encodes the outcome. The owner is supplied by the caller's
//! authentication layer, never by the payload.

use crate::domain::entities::{MoveCommand, Position};
use crate::ports::inbound::BoardOrderingApi;
use board_types::{
    BulkFailureReport, BulkUpdateRequest, BulkUpdateResponse, MoveRequest, MoveResponse, OwnerId,
    WireError,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct BoardOrderingHandler<A: BoardOrderingApi> {
    api: A,
}

impl<A: BoardOrderingApi> BoardOrderingHandler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Handle a move request. Success carries no payload.
    pub fn handle_move(&self, owner: OwnerId, request: MoveRequest) -> MoveResponse {
        let command = match decode_move(&request) {
            Ok(command) => command,
            Err(error) => {
                warn!(correlation_id = %request.correlation_id, error = %error, "Malformed move request");
                return MoveResponse::failed(request.correlation_id, error);
            }
        };

        match self.api.move_item(owner, command) {
            Ok(outcome) => {
                debug!(correlation_id = %request.correlation_id, rows = outcome.rows_written, "Move handled");
                MoveResponse::ok(request.correlation_id)
            }
            Err(e) => MoveResponse::failed(request.correlation_id, e.to_wire()),
        }
    }

    /// Handle a raw JSON move request. A body that does not parse is answered
    /// with a nil correlation id.
    pub fn handle_move_json(&self, owner: OwnerId, body: &[u8]) -> MoveResponse {
        match serde_json::from_slice::<MoveRequest>(body) {
            Ok(request) => self.handle_move(owner, request),
            Err(e) => MoveResponse::failed(
                Uuid::nil(),
                WireError::validation(format!("malformed move request: {}", e)),
            ),
        }
    }

    /// Handle a bulk update; either every entity or the first failure.
    pub fn handle_bulk(&self, owner: OwnerId, request: BulkUpdateRequest) -> BulkUpdateResponse {
        match self.api.apply_batch(owner, &request.updates) {
            Ok(entities) => BulkUpdateResponse {
                correlation_id: request.correlation_id,
                success: true,
                entities,
                failure: None,
            },
            Err(failure) => BulkUpdateResponse {
                correlation_id: request.correlation_id,
                success: false,
                entities: Vec::new(),
                failure: Some(BulkFailureReport {
                    failing_id: failure.failing_id,
                    error: failure.error.to_wire(),
                }),
            },
        }
    }
}

/// Validate the wire form of a move.
pub fn decode_move(request: &MoveRequest) -> Result<MoveCommand, WireError> {
    let target = request
        .target_scope
        .ok_or_else(|| WireError::validation("target scope is required"))?;

    let position = match &request.requested_index {
        None => Position::Append,
        Some(number) => match number.as_u64() {
            Some(index) => Position::Index(usize::try_from(index).unwrap_or(usize::MAX)),
            None if number.as_i64().is_some_and(|i| i < 0) => {
                return Err(WireError::validation("requested index must be non-negative"))
            }
            None => return Err(WireError::validation("requested index must be an integer")),
        },
    };

    let mut command = MoveCommand::new(request.item_id, target, position);
    command.expected_version = request.expected_version;
    Ok(command)
}
