//! Repository traits for domain records.
//!
//! Every method returns a boxed `'static` future so the traits stay object
//! safe and repositories can be shared as `Arc<dyn ...>` across handlers.
//! Implementations clone what they need out of `&self` before building the
//! future.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Project, ProjectId, Tag, TagId, Task, TaskId, User, UserId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A unique key is already taken.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Future returned by every repository method.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// User Repository
// =============================================================================

/// Repository for registered users.
pub trait UserRepository: Send + Sync {
    /// Finds a user by id.
    fn find_by_id(&self, id: &UserId) -> RepositoryFuture<Option<User>>;

    /// Finds a user by normalized email.
    fn find_by_email(&self, email: &str) -> RepositoryFuture<Option<User>>;

    /// Inserts a new user.
    ///
    /// Fails with [`RepositoryError::Duplicate`] when the email is taken.
    fn insert(&self, user: &User) -> RepositoryFuture<()>;

    /// Deletes every user. Returns the number removed.
    fn clear(&self) -> RepositoryFuture<u64>;
}

// =============================================================================
// Project Repository
// =============================================================================

/// Repository for projects.
pub trait ProjectRepository: Send + Sync {
    /// Finds a project by id, regardless of owner.
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>>;

    /// Lists a user's projects, oldest first.
    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Project>>;

    /// Inserts a new project.
    fn insert(&self, project: &Project) -> RepositoryFuture<()>;

    /// Replaces an existing project. Fails with `NotFound` if absent.
    fn replace(&self, project: &Project) -> RepositoryFuture<()>;

    /// Deletes a project. Returns `true` if it existed.
    fn delete(&self, id: &ProjectId) -> RepositoryFuture<bool>;

    /// Deletes every project. Returns the number removed.
    fn clear(&self) -> RepositoryFuture<u64>;
}

// =============================================================================
// Tag Repository
// =============================================================================

/// Repository for tags.
pub trait TagRepository: Send + Sync {
    /// Finds a tag by id, regardless of owner.
    fn find_by_id(&self, id: &TagId) -> RepositoryFuture<Option<Tag>>;

    /// Lists a user's tags, oldest first.
    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Tag>>;

    /// Inserts a new tag.
    fn insert(&self, tag: &Tag) -> RepositoryFuture<()>;

    /// Replaces an existing tag. Fails with `NotFound` if absent.
    fn replace(&self, tag: &Tag) -> RepositoryFuture<()>;

    /// Deletes a tag. Returns `true` if it existed.
    fn delete(&self, id: &TagId) -> RepositoryFuture<bool>;

    /// Deletes every tag. Returns the number removed.
    fn clear(&self) -> RepositoryFuture<u64>;
}

// =============================================================================
// Task Repository
// =============================================================================

/// Repository for tasks.
pub trait TaskRepository: Send + Sync {
    /// Finds a task by id, regardless of owner.
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>>;

    /// Lists a user's tasks, oldest first.
    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Task>>;

    /// Inserts a new task.
    fn insert(&self, task: &Task) -> RepositoryFuture<()>;

    /// Replaces an existing task. Fails with `NotFound` if absent.
    fn replace(&self, task: &Task) -> RepositoryFuture<()>;

    /// Deletes a task. Returns `true` if it existed.
    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool>;

    /// Deletes every task assigned to the project. Returns the number removed.
    fn delete_by_project(&self, project: &ProjectId) -> RepositoryFuture<u64>;

    /// Removes the tag from every task carrying it. Returns the number of
    /// tasks modified.
    fn pull_tag(&self, tag: &TagId) -> RepositoryFuture<u64>;

    /// Deletes every task. Returns the number removed.
    fn clear(&self) -> RepositoryFuture<u64>;
}

// =============================================================================
// Tests
// =============================================================================
