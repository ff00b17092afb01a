//! Tag endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::dto::{CreateTagRequest, DeletedResponse, TagResponse, UpdateTagRequest};
use super::error::ApiErrorResponse;
use super::handlers::{AppState, parse_path_id};
use crate::auth::CurrentUser;
use crate::domain::{OwnedRecord, Tag, TagId, Timestamp, UserId, authorize};

async fn load_owned_tag(
    state: &AppState,
    raw_id: &str,
    owner: &UserId,
) -> Result<Tag, ApiErrorResponse> {
    let tag_id = parse_path_id(raw_id, Tag::KIND, TagId::parse)?;
    let tag = state.tag_repository.find_by_id(&tag_id).await?;
    Ok(authorize(tag, owner)?)
}

/// Lists the caller's tags, oldest first.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TagResponse>>, ApiErrorResponse> {
    let tags = state.tag_repository.list_by_owner(&user.user_id).await?;
    Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

/// Returns one tag.
///
/// # Errors
///
/// Returns 404 if the tag does not exist and 401 if it belongs to another
/// user.
pub async fn get_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tag_id): Path<String>,
) -> Result<Json<TagResponse>, ApiErrorResponse> {
    let tag = load_owned_tag(&state, &tag_id, &user.user_id).await?;
    Ok(Json(TagResponse::from(&tag)))
}

/// Creates a tag owned by the caller. The color defaults to `blue-500`.
///
/// # Errors
///
/// Returns 400 for an invalid name or color.
pub async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), ApiErrorResponse> {
    let tag = request.into_tag(TagId::generate(), user.user_id, Timestamp::now())?;
    state.tag_repository.insert(&tag).await?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}

/// Renames or recolors a tag.
///
/// # Errors
///
/// Returns 404/401 as for [`get_tag`], 400 for invalid input.
pub async fn update_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tag_id): Path<String>,
    Json(request): Json<UpdateTagRequest>,
) -> Result<Json<TagResponse>, ApiErrorResponse> {
    let tag = load_owned_tag(&state, &tag_id, &user.user_id).await?;
    let tag = request.apply(tag)?;
    state.tag_repository.replace(&tag).await?;

    Ok(Json(TagResponse::from(&tag)))
}

/// Deletes a tag after removing it from every task that carries it.
///
/// # Errors
///
/// Returns 404/401 as for [`get_tag`].
pub async fn delete_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tag_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiErrorResponse> {
    let tag = load_owned_tag(&state, &tag_id, &user.user_id).await?;

    let updated_tasks = state.task_repository.pull_tag(&tag.tag_id).await?;
    state.tag_repository.delete(&tag.tag_id).await?;

    tracing::info!(tag_id = %tag.tag_id, updated_tasks, "Tag deleted");

    Ok(Json(DeletedResponse::new()))
}
