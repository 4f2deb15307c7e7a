//! # Request / Response Payloads
//!
//! JSON payloads exchanged between the client commit path and the server
//! handler. Every request carries a `correlation_id` echoed in its response.

use crate::entities::{EntityPatch, ItemId, ItemRecord};
use crate::errors::WireError;
use crate::scope::ScopeKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Move an item to `requested_index` of `target_scope`.
///
/// `requested_index` is kept as a raw JSON number so the server can reject
/// negative and fractional values explicitly; absent means append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub correlation_id: Uuid,
    pub item_id: ItemId,
    #[serde(default)]
    pub target_scope: Option<ScopeKey>,
    #[serde(default)]
    pub requested_index: Option<serde_json::Number>,
    /// Reject the move if the target scope has changed since this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

impl MoveRequest {
    pub fn new(item_id: ItemId, target_scope: ScopeKey, requested_index: Option<usize>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            item_id,
            target_scope: Some(target_scope),
            requested_index: requested_index.map(|index| serde_json::Number::from(index as u64)),
            expected_version: None,
        }
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Empty on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub correlation_id: Uuid,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl MoveResponse {
    pub fn ok(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            success: true,
            error: None,
        }
    }

    pub fn failed(correlation_id: Uuid, error: WireError) -> Self {
        Self {
            correlation_id,
            success: false,
            error: Some(error),
        }
    }
}

/// One entry of a bulk update, applied in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub id: ItemId,
    pub fields: EntityPatch,
}

impl EntityUpdate {
    pub fn new(id: ItemId, fields: EntityPatch) -> Self {
        Self { id, fields }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub correlation_id: Uuid,
    pub updates: Vec<EntityUpdate>,
}

impl BulkUpdateRequest {
    pub fn new(updates: Vec<EntityUpdate>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            updates,
        }
    }
}

/// Which update blocked the batch. `failing_id` is absent only when the
/// commit itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailureReport {
    pub failing_id: Option<ItemId>,
    pub error: WireError,
}

/// Either every updated entity, in input order, or the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    pub correlation_id: Uuid,
    pub success: bool,
    #[serde(default)]
    pub entities: Vec<ItemRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<BulkFailureReport>,
}
