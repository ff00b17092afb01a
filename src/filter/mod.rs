//! Task filtering.
//!
//! [`ActiveFilters`] is the view state a client keeps while browsing its
//! tasks. [`filter_tasks`] applies it to a task list. Nothing here touches
//! storage; the same rules back the `GET /api/tasks` query parameters.

pub mod board;

use std::borrow::Borrow;
use std::str::FromStr;

use crate::domain::{ProjectId, TagId, Task, TaskStatus};

pub use board::{DragLocation, TaskBoard, plan_status_move};

// =============================================================================
// Status Filter
// =============================================================================

/// Status criterion: every column, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// No status restriction.
    #[default]
    All,
    /// Only tasks in this status.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Returns `true` if a task in `status` passes.
    #[must_use]
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => formatter.write_str("all"),
            Self::Only(status) => write!(formatter, "{status}"),
        }
    }
}

// =============================================================================
// Active Filters
// =============================================================================

/// The filter criteria currently applied to a task list.
///
/// All criteria must hold for a task to pass. An unset criterion passes
/// everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveFilters {
    /// Case-insensitive substring of the title. Empty passes everything.
    pub search: String,
    /// Required project.
    pub project: Option<ProjectId>,
    /// A task passes if it carries any of these. Empty passes everything.
    pub tags: Vec<TagId>,
    /// Required status.
    pub status: StatusFilter,
}

impl ActiveFilters {
    /// Creates filters that pass every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Replaces the project criterion.
    pub fn set_project(&mut self, project: Option<ProjectId>) {
        self.project = project;
    }

    /// Replaces the status criterion.
    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
    }

    /// Adds a tag to the tag criterion. Already-present tags are ignored.
    pub fn add_tag(&mut self, tag: TagId) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Removes a tag from the tag criterion.
    pub fn remove_tag(&mut self, tag: &TagId) {
        self.tags.retain(|existing| existing != tag);
    }

    /// Resets every criterion.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` if no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns `true` if the task passes every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task)
            && self
                .project
                .as_ref()
                .is_none_or(|project| task.belongs_to_project(project))
            && (self.tags.is_empty() || task.has_any_tag(&self.tags))
            && self.status.matches(task.status)
    }

    fn matches_search(&self, task: &Task) -> bool {
        self.search.is_empty() || task.title.to_lowercase().contains(&self.search.to_lowercase())
    }
}

/// Keeps the tasks that pass `filters`, preserving order.
///
/// Accepts owned tasks or references, so it serves both a server that owns
/// the list it loaded and a client filtering a cached slice.
pub fn filter_tasks<'a, I>(
    tasks: I,
    filters: &'a ActiveFilters,
) -> impl Iterator<Item = I::Item> + 'a
where
    I: IntoIterator,
    I::IntoIter: 'a,
    I::Item: Borrow<Task>,
{
    tasks
        .into_iter()
        .filter(move |task| filters.matches(<I::Item as Borrow<Task>>::borrow(task)))
}

// =============================================================================
// Tests
// =============================================================================
