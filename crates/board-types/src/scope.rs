//! # Scope Keys
//!
//! A scope is the `(container, column)` pair that owns one order sequence.
//!
//! | Item kind | Container | Column |
//! |-----------|-----------|--------|
//! | Project   | `Owner`   | none   |
//! | TaskGroup | `Project` | none   |
//! | Task      | `Project` or `Group` | status |
//! | Subtask   | `Task`    | none   |
//!
//! The canonical text form (`project:<uuid>/in_progress`) is what the
//! persistence layer stores in its `scope_key` column.

use crate::entities::{ItemId, ItemKind, OwnerId, ParentRef, Status};
use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The item (or owner) that contains a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ContainerRef {
    Owner(OwnerId),
    Project(ItemId),
    Group(ItemId),
    Task(ItemId),
}

impl ContainerRef {
    fn label(&self) -> &'static str {
        match self {
            ContainerRef::Owner(_) => "owner",
            ContainerRef::Project(_) => "project",
            ContainerRef::Group(_) => "group",
            ContainerRef::Task(_) => "task",
        }
    }

    /// The containing item, if the container is an item rather than an owner.
    pub fn item_id(&self) -> Option<ItemId> {
        match *self {
            ContainerRef::Owner(_) => None,
            ContainerRef::Project(id) | ContainerRef::Group(id) | ContainerRef::Task(id) => {
                Some(id)
            }
        }
    }

    /// Kind the containing item must have.
    pub fn expected_kind(&self) -> Option<ItemKind> {
        match self {
            ContainerRef::Owner(_) => None,
            ContainerRef::Project(_) => Some(ItemKind::Project),
            ContainerRef::Group(_) => Some(ItemKind::TaskGroup),
            ContainerRef::Task(_) => Some(ItemKind::Task),
        }
    }

    /// Container for the children of an item of the given kind.
    pub fn of_item(kind: ItemKind, id: ItemId) -> Option<Self> {
        match kind {
            ItemKind::Project => Some(ContainerRef::Project(id)),
            ItemKind::TaskGroup => Some(ContainerRef::Group(id)),
            ItemKind::Task => Some(ContainerRef::Task(id)),
            ItemKind::Subtask => None,
        }
    }
}

/// Key of one independently ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey {
    pub container: ContainerRef,
    #[serde(default)]
    pub column: Option<Status>,
}

impl ScopeKey {
    pub fn new(container: ContainerRef, column: Option<Status>) -> Self {
        Self { container, column }
    }

    /// Top-level scope holding an owner's projects.
    pub fn owner_root(owner: OwnerId) -> Self {
        Self::new(ContainerRef::Owner(owner), None)
    }

    /// Scope holding the task groups of a project.
    pub fn project_groups(project: ItemId) -> Self {
        Self::new(ContainerRef::Project(project), None)
    }

    /// Column of tasks placed directly in a project.
    pub fn project_column(project: ItemId, status: Status) -> Self {
        Self::new(ContainerRef::Project(project), Some(status))
    }

    /// Column of tasks placed in a task group.
    pub fn group_column(group: ItemId, status: Status) -> Self {
        Self::new(ContainerRef::Group(group), Some(status))
    }

    /// Scope holding the subtasks of a task.
    pub fn subtasks(task: ItemId) -> Self {
        Self::new(ContainerRef::Task(task), None)
    }

    /// Scope of a task or subtask, derived from its parent variant.
    pub fn for_work_item(project: ItemId, parent: ParentRef, status: Status) -> Self {
        match parent {
            ParentRef::None => Self::project_column(project, status),
            ParentRef::Group(group) => Self::group_column(group, status),
            ParentRef::Task(task) => Self::subtasks(task),
        }
    }

    /// Same container, different column.
    pub fn with_column(self, status: Status) -> Self {
        Self::new(self.container, Some(status))
    }

    /// Whether items of `kind` may live in this scope.
    pub fn admits(&self, kind: ItemKind) -> bool {
        matches!(
            (kind, &self.container, self.column),
            (ItemKind::Project, ContainerRef::Owner(_), None)
                | (ItemKind::TaskGroup, ContainerRef::Project(_), None)
                | (ItemKind::Task, ContainerRef::Project(_), Some(_))
                | (ItemKind::Task, ContainerRef::Group(_), Some(_))
                | (ItemKind::Subtask, ContainerRef::Task(_), None)
        )
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self.container {
            ContainerRef::Owner(owner) => owner.0,
            ContainerRef::Project(id) | ContainerRef::Group(id) | ContainerRef::Task(id) => id.0,
        };
        write!(f, "{}:{}", self.container.label(), id)?;
        if let Some(column) = self.column {
            write!(f, "/{}", column)?;
        }
        Ok(())
    }
}

impl FromStr for ScopeKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedScope(s.to_string());

        let (container_part, column) = match s.split_once('/') {
            Some((head, column)) => (head, Some(column.parse::<Status>()?)),
            None => (s, None),
        };
        let (label, id) = container_part.split_once(':').ok_or_else(malformed)?;

        let container = match label {
            "owner" => ContainerRef::Owner(id.parse()?),
            "project" => ContainerRef::Project(id.parse()?),
            "group" => ContainerRef::Group(id.parse()?),
            "task" => ContainerRef::Task(id.parse()?),
            _ => return Err(malformed()),
        };

        Ok(Self { container, column })
    }
}
