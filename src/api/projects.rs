//! Project endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::dto::{CreateProjectRequest, DeletedResponse, ProjectResponse, UpdateProjectRequest};
use super::error::ApiErrorResponse;
use super::handlers::{AppState, parse_path_id};
use crate::auth::CurrentUser;
use crate::domain::{OwnedRecord, Project, ProjectId, Timestamp, UserId, authorize};

async fn load_owned_project(
    state: &AppState,
    raw_id: &str,
    owner: &UserId,
) -> Result<Project, ApiErrorResponse> {
    let project_id = parse_path_id(raw_id, Project::KIND, ProjectId::parse)?;
    let project = state.project_repository.find_by_id(&project_id).await?;
    Ok(authorize(project, owner)?)
}

/// Lists the caller's projects, oldest first.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ProjectResponse>>, ApiErrorResponse> {
    let projects = state.project_repository.list_by_owner(&user.user_id).await?;
    Ok(Json(projects.iter().map(ProjectResponse::from).collect()))
}

/// Returns one project.
///
/// # Errors
///
/// Returns 404 if the project does not exist and 401 if it belongs to
/// another user.
pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiErrorResponse> {
    let project = load_owned_project(&state, &project_id, &user.user_id).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Creates a project owned by the caller.
///
/// # Errors
///
/// Returns 400 for an invalid name.
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiErrorResponse> {
    let project = request.into_project(ProjectId::generate(), user.user_id, Timestamp::now())?;
    state.project_repository.insert(&project).await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// Renames a project.
///
/// # Errors
///
/// Returns 404/401 as for [`get_project`], 400 for an invalid name.
pub async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiErrorResponse> {
    let project = load_owned_project(&state, &project_id, &user.user_id).await?;
    let project = request.apply(project)?;
    state.project_repository.replace(&project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Deletes a project together with every task assigned to it.
///
/// Tasks go first so a failure never leaves tasks pointing at a missing
/// project.
///
/// # Errors
///
/// Returns 404/401 as for [`get_project`].
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiErrorResponse> {
    let project = load_owned_project(&state, &project_id, &user.user_id).await?;

    // Two separate writes. If the project delete fails, a retry finishes it.
    let removed_tasks = state
        .task_repository
        .delete_by_project(&project.project_id)
        .await?;
    state.project_repository.delete(&project.project_id).await?;

    tracing::info!(
        project_id = %project.project_id,
        removed_tasks,
        "Project deleted"
    );

    Ok(Json(DeletedResponse::new()))
}
