//! Project domain model.
//!
//! A project groups tasks. Deleting a project deletes its tasks.

use serde::{Deserialize, Serialize};

use super::{OwnedRecord, Timestamp, UserId, define_id};

define_id!(
    /// Unique identifier for a project.
    ProjectId
);

/// The project domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project.
    pub project_id: ProjectId,
    /// Owning user.
    pub owner: UserId,
    /// Project name.
    pub name: String,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Project {
    /// Creates a new project.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        owner: UserId,
        name: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            project_id,
            owner,
            name: name.into(),
            created_at,
        }
    }

    /// Returns a new project with the given name.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }
}

impl OwnedRecord for Project {
    const KIND: &'static str = "Project";

    fn owner(&self) -> &UserId {
        &self.owner
    }

    fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
