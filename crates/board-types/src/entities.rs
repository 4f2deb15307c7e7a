//! # Core Domain Entities
//!
//! Items form a strict containment hierarchy:
//! Project → TaskGroup → Task → Subtask. Every item lives in exactly one
//! scope and holds one `order` slot within it.

use crate::errors::ParseError;
use crate::scope::ScopeKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of any ordered item (project, group, task, subtask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ParseError::InvalidId(s.to_string()))
    }
}

/// Identifier of the authenticated owner of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ParseError::InvalidId(s.to_string()))
    }
}

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Kind of an ordered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Project,
    TaskGroup,
    Task,
    Subtask,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Project => "project",
            ItemKind::TaskGroup => "task_group",
            ItemKind::Task => "task",
            ItemKind::Subtask => "subtask",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(ItemKind::Project),
            "task_group" => Ok(ItemKind::TaskGroup),
            "task" => Ok(ItemKind::Task),
            "subtask" => Ok(ItemKind::Subtask),
            other => Err(ParseError::UnknownVariant {
                what: "item kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Kanban column of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Backlog,
    Todo,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Backlog => "backlog",
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::UnknownVariant {
                what: "status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(ParseError::UnknownVariant {
                what: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Parent of a work item (task or subtask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    /// Task placed directly in its project.
    #[default]
    None,
    /// Task placed inside a task group.
    Group(ItemId),
    /// Subtask of a task.
    Task(ItemId),
}

// =============================================================================
// RECORDS
// =============================================================================

/// A persisted, ordered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub owner: OwnerId,
    pub kind: ItemKind,
    pub scope: ScopeKey,
    /// Slot within `scope`; contiguous `0..n-1` across the scope.
    pub order: u32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl ItemRecord {
    /// Kanban column, for items whose scope has one.
    pub fn status(&self) -> Option<Status> {
        self.scope.column
    }
}

/// Where a new item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Placement {
    Project,
    TaskGroup {
        project: ItemId,
    },
    WorkItem {
        project: ItemId,
        parent: ParentRef,
        status: Status,
    },
}

impl Placement {
    pub fn kind(&self) -> ItemKind {
        match self {
            Placement::Project => ItemKind::Project,
            Placement::TaskGroup { .. } => ItemKind::TaskGroup,
            Placement::WorkItem {
                parent: ParentRef::Task(_),
                ..
            } => ItemKind::Subtask,
            Placement::WorkItem { .. } => ItemKind::Task,
        }
    }

    pub fn scope(&self, owner: OwnerId) -> ScopeKey {
        match *self {
            Placement::Project => ScopeKey::owner_root(owner),
            Placement::TaskGroup { project } => ScopeKey::project_groups(project),
            Placement::WorkItem {
                project,
                parent,
                status,
            } => ScopeKey::for_work_item(project, parent, status),
        }
    }
}

/// Input for creating an item. Title validation happens server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub placement: Placement,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl NewItem {
    pub fn new(placement: Placement, title: impl Into<String>) -> Self {
        Self {
            placement,
            title: title.into(),
            description: None,
            priority: Priority::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Field changes applied by a bulk update.
///
/// An empty `description` clears it. `status` is only meaningful for tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl EntityPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
