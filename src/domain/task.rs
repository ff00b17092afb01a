//! Task domain model.
//!
//! Tasks live in one of three status columns, may belong to a project,
//! reference any number of tags, and carry an ordered checklist.

use serde::{Deserialize, Serialize};

use super::{OwnedRecord, ProjectId, TagId, Timestamp, UserId, define_id};

define_id!(
    /// Unique identifier for a task.
    TaskId
);

define_id!(
    /// Unique identifier for a checklist item.
    ChecklistItemId
);

// =============================================================================
// Enums
// =============================================================================

/// The status column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// All statuses in board order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Returns the wire name (`pending`, `in-progress`, `completed`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "Unknown status '{other}'. Expected pending, in-progress or completed"
            )),
        }
    }
}

// =============================================================================
// ChecklistItem
// =============================================================================

/// One line of a task's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique identifier for the item.
    pub item_id: ChecklistItemId,
    /// Item text.
    pub text: String,
    /// Whether the item has been ticked.
    pub completed: bool,
}

impl ChecklistItem {
    /// Creates an unticked item.
    #[must_use]
    pub fn new(item_id: ChecklistItemId, text: impl Into<String>) -> Self {
        Self {
            item_id,
            text: text.into(),
            completed: false,
        }
    }

    /// Returns a new item with the completed flag set to the given value.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }
}

// =============================================================================
// Task
// =============================================================================

/// The main task domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct Task {
    /// Unique identifier for the task.
    pub task_id: TaskId,
    /// Owning user.
    pub owner: UserId,
    /// Title of the task.
    pub title: String,
    /// Optional detailed description.
    pub description: Option<String>,
    /// Current status column.
    pub status: TaskStatus,
    /// Project the task belongs to, if any.
    pub project: Option<ProjectId>,
    /// Attached tags, without duplicates, in attachment order.
    pub tags: Vec<TagId>,
    /// Ordered checklist.
    pub checklist: Vec<ChecklistItem>,
    /// Optional due date.
    pub due_date: Option<Timestamp>,
    /// Optional image, usually a `data:` URL.
    pub image: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Task {
    /// Creates a pending task with no project, tags, checklist, due date or image.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        owner: UserId,
        title: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            task_id,
            owner,
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            project: None,
            tags: Vec::new(),
            checklist: Vec::new(),
            due_date: None,
            image: None,
            created_at,
        }
    }

    // -------------------------------------------------------------------------
    // Builder-style methods
    // -------------------------------------------------------------------------

    /// Returns a new task with the given title.
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    /// Returns a new task with the given description.
    #[must_use]
    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Returns a new task with the given status.
    #[must_use]
    pub fn with_status(self, status: TaskStatus) -> Self {
        Self { status, ..self }
    }

    /// Returns a new task assigned to the given project (or none).
    #[must_use]
    pub fn with_project(self, project: Option<ProjectId>) -> Self {
        Self { project, ..self }
    }

    /// Returns a new task with the given tags, dropping repeated ids.
    #[must_use]
    pub fn with_tags(self, tags: Vec<TagId>) -> Self {
        let mut unique: Vec<TagId> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        Self {
            tags: unique,
            ..self
        }
    }

    /// Returns a new task with the given checklist.
    #[must_use]
    pub fn with_checklist(self, checklist: Vec<ChecklistItem>) -> Self {
        Self { checklist, ..self }
    }

    /// Returns a new task with the given due date.
    #[must_use]
    pub fn with_due_date(self, due_date: Option<Timestamp>) -> Self {
        Self { due_date, ..self }
    }

    /// Returns a new task with the given image.
    #[must_use]
    pub fn with_image(self, image: Option<String>) -> Self {
        Self { image, ..self }
    }

    // -------------------------------------------------------------------------
    // Tag and project references
    // -------------------------------------------------------------------------

    /// Returns `true` if the task carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &TagId) -> bool {
        self.tags.contains(tag)
    }

    /// Returns `true` if the task carries at least one of `tags`.
    #[must_use]
    pub fn has_any_tag(&self, tags: &[TagId]) -> bool {
        tags.iter().any(|tag| self.has_tag(tag))
    }

    /// Removes the tag in place. Returns `true` if it was present.
    pub fn remove_tag(&mut self, tag: &TagId) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }

    /// Returns `true` if the task is assigned to the given project.
    #[must_use]
    pub fn belongs_to_project(&self, project: &ProjectId) -> bool {
        self.project.as_ref() == Some(project)
    }
}

impl OwnedRecord for Task {
    const KIND: &'static str = "Task";

    fn owner(&self) -> &UserId {
        &self.owner
    }

    fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

// =============================================================================
// Tests
// =============================================================================
