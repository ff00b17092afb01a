//! Task endpoints.
//!
//! Every route is guarded by [`CurrentUser`] and only ever exposes the
//! caller's own tasks.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::dto::{
    BoardResponse, CreateTaskRequest, DeletedResponse, MoveTaskRequest, TaskListQuery,
    TaskResponse, UpdateTaskRequest,
};
use super::error::{ApiErrorResponse, ValidationError};
use super::handlers::{AppState, parse_path_id};
use crate::auth::CurrentUser;
use crate::domain::{OwnedRecord, TagId, Task, TaskId, Timestamp, UserId, authorize};
use crate::filter::{TaskBoard, filter_tasks, plan_status_move};

// =============================================================================
// Helper Functions
// =============================================================================

/// Loads a task by its raw path id and checks the caller owns it.
async fn load_owned_task(
    state: &AppState,
    raw_id: &str,
    owner: &UserId,
) -> Result<Task, ApiErrorResponse> {
    let task_id = parse_path_id(raw_id, Task::KIND, TaskId::parse)?;
    let task = state.task_repository.find_by_id(&task_id).await?;
    Ok(authorize(task, owner)?)
}

/// Checks the task only references the owner's project and tags.
async fn ensure_references(
    state: &AppState,
    owner: &UserId,
    task: &Task,
) -> Result<(), ApiErrorResponse> {
    let mut errors = ValidationError::default();

    if let Some(project_id) = &task.project {
        let project = state.project_repository.find_by_id(project_id).await?;
        if !project.is_some_and(|project| project.is_owned_by(owner)) {
            errors.push("project", "Project not found");
        }
    }

    if !task.tags.is_empty() {
        let owned: HashSet<TagId> = state
            .tag_repository
            .list_by_owner(owner)
            .await?
            .into_iter()
            .map(|tag| tag.tag_id)
            .collect();
        for (index, tag) in task.tags.iter().enumerate() {
            if !owned.contains(tag) {
                errors.push(format!("tags[{index}]"), "Tag not found");
            }
        }
    }

    Ok(errors.into_result(())?)
}

// =============================================================================
// Query Handlers
// =============================================================================

/// Lists the caller's tasks, oldest first.
///
/// # Query Parameters
///
/// - `search`: case-insensitive title substring
/// - `project`: project id
/// - `tags`: comma-separated tag ids; a task matches if it has any of them
/// - `status`: `all` (default), `pending`, `in-progress` or `completed`
///
/// # Errors
///
/// Returns 400 for malformed filter values and 500 on storage failure.
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let filters = query.into_filters()?;
    let tasks = state.task_repository.list_by_owner(&user.user_id).await?;

    Ok(Json(
        filter_tasks(&tasks, &filters)
            .map(TaskResponse::from)
            .collect(),
    ))
}

/// Returns the caller's tasks grouped into status columns.
///
/// Accepts the same query parameters as [`list_tasks`].
///
/// # Errors
///
/// Returns 400 for malformed filter values and 500 on storage failure.
pub async fn task_board(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<BoardResponse>, ApiErrorResponse> {
    let filters = query.into_filters()?;
    let tasks = state.task_repository.list_by_owner(&user.user_id).await?;
    let board = TaskBoard::from_tasks(filter_tasks(tasks, &filters));

    Ok(Json(BoardResponse::from(&board)))
}

/// Returns one task.
///
/// # Errors
///
/// Returns 404 if the task does not exist and 401 if it belongs to another
/// user.
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task = load_owned_task(&state, &task_id, &user.user_id).await?;
    Ok(Json(TaskResponse::from(&task)))
}

// =============================================================================
// Mutation Handlers
// =============================================================================

/// Creates a task owned by the caller.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Task title",
///   "description": "Optional description",
///   "status": "pending|in-progress|completed",
///   "project": "<project id>",
///   "tags": ["<tag id>"],
///   "checklist": [{ "text": "Step", "completed": false }],
///   "dueDate": "2024-06-01",
///   "image": "data:image/png;base64,..."
/// }
/// ```
///
/// Any `user` field in the body is ignored.
///
/// # Response
///
/// - **201 Created**: the created task
/// - **400 Bad Request**: validation error, including references to
///   projects or tags the caller does not own
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for invalid input or storage failure.
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let task = request.into_task(TaskId::generate(), user.user_id.clone(), Timestamp::now())?;
    ensure_references(&state, &user.user_id, &task).await?;

    state.task_repository.insert(&task).await?;
    tracing::debug!(task_id = %task.task_id, "Task created");

    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// Partially updates a task.
///
/// Only fields present in the body change. `null` clears `description`,
/// `project`, `dueDate` and `image`.
///
/// # Errors
///
/// Returns 404/401 as for [`get_task`], 400 for invalid input.
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task = load_owned_task(&state, &task_id, &user.user_id).await?;
    let task = request.apply(task)?;
    ensure_references(&state, &user.user_id, &task).await?;

    state.task_repository.replace(&task).await?;

    Ok(Json(TaskResponse::from(&task)))
}

/// Applies a board drag-and-drop to a task.
///
/// Dropping outside the board or back into the original slot leaves the
/// task untouched; any other drop moves it to the destination column.
///
/// # Errors
///
/// Returns 404/401 as for [`get_task`].
pub async fn move_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
    Json(request): Json<MoveTaskRequest>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task = load_owned_task(&state, &task_id, &user.user_id).await?;

    let task = match plan_status_move(request.source, request.destination) {
        Some(status) if status != task.status => {
            let task = task.with_status(status);
            state.task_repository.replace(&task).await?;
            tracing::debug!(task_id = %task.task_id, %status, "Task moved");
            task
        }
        _ => task,
    };

    Ok(Json(TaskResponse::from(&task)))
}

/// Deletes a task.
///
/// # Response
///
/// - **200 OK**: `{ "success": true, "data": {} }`
///
/// # Errors
///
/// Returns 404/401 as for [`get_task`].
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiErrorResponse> {
    let task = load_owned_task(&state, &task_id, &user.user_id).await?;

    state.task_repository.delete(&task.task_id).await?;
    tracing::debug!(task_id = %task.task_id, "Task deleted");

    Ok(Json(DeletedResponse::new()))
}
