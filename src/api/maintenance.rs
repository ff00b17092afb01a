//! Database reset, for development and end-to-end test runs.
//!
//! Compiled only with the `maintenance` feature and mounted only when
//! `ENABLE_CLEAR_DATABASE` is set. There is no authentication on this
//! route; it removes every user too.

use axum::{Json, extract::State};
use serde::Serialize;

use super::error::ApiErrorResponse;
use super::handlers::AppState;

/// Response DTO for `DELETE /api/clear-database`.
#[derive(Debug, Clone, Serialize)]
pub struct ClearDatabaseResponse {
    /// Always `true`.
    pub success: bool,
    /// Summary of what was removed.
    pub message: String,
}

/// Empties every collection.
///
/// Tasks are removed before the records they reference.
///
/// # Errors
///
/// Returns 500 if any collection cannot be cleared.
pub async fn clear_database(
    State(state): State<AppState>,
) -> Result<Json<ClearDatabaseResponse>, ApiErrorResponse> {
    let tasks = state.task_repository.clear().await?;
    let tags = state.tag_repository.clear().await?;
    let projects = state.project_repository.clear().await?;
    let users = state.user_repository.clear().await?;

    tracing::warn!(users, projects, tags, tasks, "Database cleared");

    Ok(Json(ClearDatabaseResponse {
        success: true,
        message: format!(
            "Database cleared: {users} users, {projects} projects, {tags} tags and {tasks} tasks removed"
        ),
    }))
}
