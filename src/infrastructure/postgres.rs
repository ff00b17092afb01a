//! `PostgreSQL` repository implementations.
//!
//! Records are stored as JSONB documents, one table per collection. The
//! columns next to `data` only exist for lookups the store has to do
//! itself: owner listing, email uniqueness and the project cascade.
//!
//! # Table Schema
//!
//! See [`SCHEMA`]. It is applied idempotently by [`apply_schema`] when the
//! factory connects.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;

use crate::domain::{Project, ProjectId, Tag, TagId, Task, TaskId, User, UserId};
use crate::infrastructure::{
    ProjectRepository, RepositoryError, RepositoryFuture, TagRepository, TaskRepository,
    UserRepository,
};

/// DDL for the document tables.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_user_id ON projects(user_id);

CREATE TABLE IF NOT EXISTS tags (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tags_user_id ON tags(user_id);

CREATE TABLE IF NOT EXISTS tasks (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    project_id UUID,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id);
CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id);
";

/// Creates the document tables if they do not exist.
///
/// # Errors
///
/// Returns `RepositoryError::DatabaseError` if the DDL fails.
pub async fn apply_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(database_error)?;
    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(database) if database.is_unique_violation())
}

fn to_document<T: Serialize>(record: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(record)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

fn from_document<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, RepositoryError> {
    serde_json::from_value(data)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

/// Fetches one document by primary key from `table`.
async fn fetch_one<T: DeserializeOwned>(
    pool: &PgPool,
    table: &'static str,
    id: uuid::Uuid,
) -> Result<Option<T>, RepositoryError> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as(&format!("SELECT data FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(database_error)?;

    row.map(|(data,)| from_document(data)).transpose()
}

/// Fetches every document owned by `owner` from `table`, oldest first.
async fn fetch_owned<T: DeserializeOwned>(
    pool: &PgPool,
    table: &'static str,
    owner: uuid::Uuid,
) -> Result<Vec<T>, RepositoryError> {
    let rows: Vec<(serde_json::Value,)> = sqlx::query_as(&format!(
        "SELECT data FROM {table} WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await
    .map_err(database_error)?;

    rows.into_iter().map(|(data,)| from_document(data)).collect()
}

/// Inserts an owned document into a `(id, user_id, data, created_at)` table.
async fn insert_owned<T: Serialize>(
    pool: &PgPool,
    table: &'static str,
    id: uuid::Uuid,
    owner: uuid::Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    record: &T,
) -> Result<(), RepositoryError> {
    let data = to_document(record)?;
    sqlx::query(&format!(
        "INSERT INTO {table} (id, user_id, data, created_at) VALUES ($1, $2, $3, $4)"
    ))
    .bind(id)
    .bind(owner)
    .bind(&data)
    .bind(created_at)
    .execute(pool)
    .await
    .map_err(|error| {
        if is_unique_violation(&error) {
            RepositoryError::Duplicate(format!("{table}.id {id}"))
        } else {
            database_error(error)
        }
    })?;
    Ok(())
}

/// Replaces the `data` column of an existing document.
async fn replace_data<T: Serialize>(
    pool: &PgPool,
    table: &'static str,
    id: uuid::Uuid,
    record: &T,
) -> Result<(), RepositoryError> {
    let data = to_document(record)?;
    let result = sqlx::query(&format!("UPDATE {table} SET data = $1 WHERE id = $2"))
        .bind(&data)
        .bind(id)
        .execute(pool)
        .await
        .map_err(database_error)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound(id.to_string()));
    }
    Ok(())
}

async fn delete_one(pool: &PgPool, table: &'static str, id: uuid::Uuid) -> Result<bool, RepositoryError> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await
        .map_err(database_error)?;
    Ok(result.rows_affected() > 0)
}

async fn delete_all(pool: &PgPool, table: &'static str) -> Result<u64, RepositoryError> {
    let result = sqlx::query(&format!("DELETE FROM {table}"))
        .execute(pool)
        .await
        .map_err(database_error)?;
    Ok(result.rows_affected())
}

// =============================================================================
// PostgreSQL User Repository
// =============================================================================

/// `PostgreSQL` implementation of `UserRepository`.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresUserRepository {
    fn find_by_id(&self, id: &UserId) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { fetch_one(&pool, "users", id).await })
    }

    fn find_by_email(&self, email: &str) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        let email = email.to_string();
        Box::pin(async move {
            let row: Option<(serde_json::Value,)> =
                sqlx::query_as("SELECT data FROM users WHERE email = $1")
                    .bind(&email)
                    .fetch_optional(&pool)
                    .await
                    .map_err(database_error)?;
            row.map(|(data,)| from_document(data)).transpose()
        })
    }

    fn insert(&self, user: &User) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let user = user.clone();
        Box::pin(async move {
            let data = to_document(&user)?;
            sqlx::query("INSERT INTO users (id, email, data, created_at) VALUES ($1, $2, $3, $4)")
                .bind(user.user_id.as_uuid())
                .bind(&user.email)
                .bind(&data)
                .bind(user.created_at.as_datetime())
                .execute(&pool)
                .await
                .map_err(|error| {
                    if is_unique_violation(&error) {
                        RepositoryError::Duplicate(format!("email {}", user.email))
                    } else {
                        database_error(error)
                    }
                })?;
            Ok(())
        })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move { delete_all(&pool, "users").await })
    }
}

// =============================================================================
// PostgreSQL Project Repository
// =============================================================================

/// `PostgreSQL` implementation of `ProjectRepository`.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProjectRepository for PostgresProjectRepository {
    fn find_by_id(&self, id: &ProjectId) -> RepositoryFuture<Option<Project>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { fetch_one(&pool, "projects", id).await })
    }

    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Project>> {
        let pool = self.pool.clone();
        let owner = *owner.as_uuid();
        Box::pin(async move { fetch_owned(&pool, "projects", owner).await })
    }

    fn insert(&self, project: &Project) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let project = project.clone();
        Box::pin(async move {
            insert_owned(
                &pool,
                "projects",
                *project.project_id.as_uuid(),
                *project.owner.as_uuid(),
                *project.created_at.as_datetime(),
                &project,
            )
            .await
        })
    }

    fn replace(&self, project: &Project) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let project = project.clone();
        Box::pin(async move {
            replace_data(&pool, "projects", *project.project_id.as_uuid(), &project).await
        })
    }

    fn delete(&self, id: &ProjectId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { delete_one(&pool, "projects", id).await })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move { delete_all(&pool, "projects").await })
    }
}

// =============================================================================
// PostgreSQL Tag Repository
// =============================================================================

/// `PostgreSQL` implementation of `TagRepository`.
#[derive(Debug, Clone)]
pub struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    /// Creates a repository on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TagRepository for PostgresTagRepository {
    fn find_by_id(&self, id: &TagId) -> RepositoryFuture<Option<Tag>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { fetch_one(&pool, "tags", id).await })
    }

    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Tag>> {
        let pool = self.pool.clone();
        let owner = *owner.as_uuid();
        Box::pin(async move { fetch_owned(&pool, "tags", owner).await })
    }

    fn insert(&self, tag: &Tag) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let tag = tag.clone();
        Box::pin(async move {
            insert_owned(
                &pool,
                "tags",
                *tag.tag_id.as_uuid(),
                *tag.owner.as_uuid(),
                *tag.created_at.as_datetime(),
                &tag,
            )
            .await
        })
    }

    fn replace(&self, tag: &Tag) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let tag = tag.clone();
        Box::pin(async move { replace_data(&pool, "tags", *tag.tag_id.as_uuid(), &tag).await })
    }

    fn delete(&self, id: &TagId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { delete_one(&pool, "tags", id).await })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move { delete_all(&pool, "tags").await })
    }
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// `project_id` is kept in step with `data.project` so the project cascade
/// can use an index instead of a JSONB scan.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a repository on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn find_by_id(&self, id: &TaskId) -> RepositoryFuture<Option<Task>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { fetch_one(&pool, "tasks", id).await })
    }

    fn list_by_owner(&self, owner: &UserId) -> RepositoryFuture<Vec<Task>> {
        let pool = self.pool.clone();
        let owner = *owner.as_uuid();
        Box::pin(async move { fetch_owned(&pool, "tasks", owner).await })
    }

    fn insert(&self, task: &Task) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let task = task.clone();
        Box::pin(async move {
            let data = to_document(&task)?;
            sqlx::query(
                "INSERT INTO tasks (id, user_id, project_id, data, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(task.task_id.as_uuid())
            .bind(task.owner.as_uuid())
            .bind(task.project.as_ref().map(|project| *project.as_uuid()))
            .bind(&data)
            .bind(task.created_at.as_datetime())
            .execute(&pool)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    RepositoryError::Duplicate(format!("tasks.id {}", task.task_id))
                } else {
                    database_error(error)
                }
            })?;
            Ok(())
        })
    }

    fn replace(&self, task: &Task) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let task = task.clone();
        Box::pin(async move {
            let data = to_document(&task)?;
            let result = sqlx::query("UPDATE tasks SET data = $1, project_id = $2 WHERE id = $3")
                .bind(&data)
                .bind(task.project.as_ref().map(|project| *project.as_uuid()))
                .bind(task.task_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(database_error)?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(task.task_id.to_string()));
            }
            Ok(())
        })
    }

    fn delete(&self, id: &TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        Box::pin(async move { delete_one(&pool, "tasks", id).await })
    }

    fn delete_by_project(&self, project: &ProjectId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let project = *project.as_uuid();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
                .bind(project)
                .execute(&pool)
                .await
                .map_err(database_error)?;
            Ok(result.rows_affected())
        })
    }

    fn pull_tag(&self, tag: &TagId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let tag = tag.to_string();
        Box::pin(async move {
            // jsonb `-` on an array removes every string element equal to the operand.
            let result = sqlx::query(
                "UPDATE tasks SET data = jsonb_set(data, '{tags}', (data->'tags') - $1::text) \
                 WHERE data->'tags' ? $1::text",
            )
            .bind(&tag)
            .execute(&pool)
            .await
            .map_err(database_error)?;
            Ok(result.rows_affected())
        })
    }

    fn clear(&self) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move { delete_all(&pool, "tasks").await })
    }
}

// =============================================================================
// Tests
// =============================================================================
