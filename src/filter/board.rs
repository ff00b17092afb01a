//! Status board view-state.
//!
//! The dashboard shows one column per [`TaskStatus`]. Dragging a card
//! between columns is a status change; dropping it back where it came from
//! is not.

use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskStatus};

/// A position on the board: a column and a slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    /// Column, identified by its status.
    pub column: TaskStatus,
    /// Zero-based slot in the column.
    pub index: usize,
}

impl DragLocation {
    /// Creates a location.
    #[must_use]
    pub const fn new(column: TaskStatus, index: usize) -> Self {
        Self { column, index }
    }
}

/// Decides what status a dropped card should take.
///
/// Returns `None` when nothing should be written: the card was dropped
/// outside any column, or back into its own slot. Any other drop yields the
/// destination column's status, which may equal the current one when the
/// card was only reordered.
#[must_use]
pub fn plan_status_move(
    source: DragLocation,
    destination: Option<DragLocation>,
) -> Option<TaskStatus> {
    let destination = destination?;
    if destination == source {
        return None;
    }
    Some(destination.column)
}

/// Tasks grouped into status columns, each in input order.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    /// `pending` column.
    pub pending: Vec<Task>,
    /// `in-progress` column.
    pub in_progress: Vec<Task>,
    /// `completed` column.
    pub completed: Vec<Task>,
}

impl TaskBoard {
    /// Distributes tasks into their columns.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.column_mut(task.status).push(task);
        }
        board
    }

    /// Returns the tasks in one column.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
        }
    }

    const fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    /// Total number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.in_progress.len() + self.completed.len()
    }

    /// Returns `true` if every column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
