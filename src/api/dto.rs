//! Data Transfer Objects for API requests and responses.
//!
//! The wire format uses camelCase names, `_id` for record identifiers and
//! `user` for the owner. Requests are deserialized leniently (missing
//! strings default to empty) so that every problem surfaces as a
//! `VALIDATION_ERROR` with field details instead of a body rejection.

use serde::{Deserialize, Deserializer, Serialize};

use super::error::{FieldError, ValidationError};
use crate::domain::user::normalize_email;
use crate::domain::{
    ChecklistItem, ChecklistItemId, Project, ProjectId, Tag, TagId, Task, TaskId, TaskStatus,
    Timestamp, User, UserId,
};
use crate::filter::{ActiveFilters, DragLocation, StatusFilter, TaskBoard};

/// Longest accepted user name, in characters.
pub const MAX_USER_NAME_LENGTH: usize = 100;
/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Longest accepted project name, in characters.
pub const MAX_PROJECT_NAME_LENGTH: usize = 100;
/// Longest accepted tag name, in characters.
pub const MAX_TAG_NAME_LENGTH: usize = 50;
/// Longest accepted tag color token, in characters.
pub const MAX_TAG_COLOR_LENGTH: usize = 30;
/// Longest accepted task title, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;
/// Longest accepted task description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
/// Longest accepted checklist item text, in characters.
pub const MAX_CHECKLIST_TEXT_LENGTH: usize = 200;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = "nullable")]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Auth DTOs
// =============================================================================

/// Request DTO for `POST /api/auth/register`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// A registration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    /// Trimmed display name.
    pub name: String,
    /// Normalized email.
    pub email: String,
    /// Password, untouched.
    pub password: String,
}

impl RegisterRequest {
    /// Validates every field, reporting all failures together.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing each invalid field.
    pub fn validate(self) -> Result<ValidRegistration, ValidationError> {
        match (
            required_text("name", "Name", &self.name, MAX_USER_NAME_LENGTH),
            validate_email(&self.email),
            validate_password(&self.password),
        ) {
            (Ok(name), Ok(email), Ok(())) => Ok(ValidRegistration {
                name,
                email,
                password: self.password,
            }),
            (name, email, password) => Err(ValidationError::combine([
                name.err(),
                email.err(),
                password.err(),
            ])),
        }
    }
}

/// Request DTO for `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl LoginRequest {
    /// Checks both fields are present and returns the normalized email.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either field is empty.
    pub fn validate(&self) -> Result<String, ValidationError> {
        let mut errors = ValidationError::default();
        let email = normalize_email(&self.email);
        if email.is_empty() {
            errors.push("email", "Email is required");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.into_result(email)
    }
}

/// Response DTO for a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Registration timestamp.
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response DTO for register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: UserResponse,
}

// =============================================================================
// Project DTOs
// =============================================================================

/// Request DTO for creating a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
}

impl CreateProjectRequest {
    /// Builds the project for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is invalid.
    pub fn into_project(
        self,
        project_id: ProjectId,
        owner: UserId,
        created_at: Timestamp,
    ) -> Result<Project, ValidationError> {
        let name = validate_project_name(&self.name)?;
        Ok(Project::new(project_id, owner, name, created_at))
    }
}

/// Request DTO for updating a project. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProjectRequest {
    /// New name.
    pub name: Option<String>,
}

impl UpdateProjectRequest {
    /// Applies the provided fields to `project`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a provided field is invalid.
    pub fn apply(self, project: Project) -> Result<Project, ValidationError> {
        match self.name {
            Some(name) => Ok(project.with_name(validate_project_name(&name)?)),
            None => Ok(project),
        }
    }
}

/// Response DTO for a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    /// Project ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Project name.
    pub name: String,
    /// Owner ID.
    pub user: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.project_id.to_string(),
            name: project.name.clone(),
            user: project.owner.to_string(),
            created_at: project.created_at.to_rfc3339(),
        }
    }
}

// =============================================================================
// Tag DTOs
// =============================================================================

/// Request DTO for creating a tag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTagRequest {
    /// Tag name.
    pub name: String,
    /// Palette color token. Defaults to `blue-500`.
    pub color: Option<String>,
}

impl CreateTagRequest {
    /// Builds the tag for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing each invalid field.
    pub fn into_tag(
        self,
        tag_id: TagId,
        owner: UserId,
        created_at: Timestamp,
    ) -> Result<Tag, ValidationError> {
        match (
            validate_tag_name(&self.name),
            validate_tag_color(self.color.as_deref()),
        ) {
            (Ok(name), Ok(color)) => {
                let tag = Tag::new(tag_id, owner, name, created_at);
                Ok(match color {
                    Some(color) => tag.with_color(color),
                    None => tag,
                })
            }
            (name, color) => Err(ValidationError::combine([name.err(), color.err()])),
        }
    }
}

/// Request DTO for updating a tag. Absent fields are left unchanged; an
/// empty color resets it to the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTagRequest {
    /// New name.
    pub name: Option<String>,
    /// New color.
    pub color: Option<String>,
}

impl UpdateTagRequest {
    /// Applies the provided fields to `tag`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing each invalid field.
    pub fn apply(self, tag: Tag) -> Result<Tag, ValidationError> {
        let name = self.name.as_deref().map(validate_tag_name).transpose();
        let color = self
            .color
            .as_deref()
            .map(|color| validate_tag_color(Some(color)))
            .transpose();

        match (name, color) {
            (Ok(name), Ok(color)) => {
                let tag = match name {
                    Some(name) => tag.with_name(name),
                    None => tag,
                };
                Ok(match color {
                    Some(Some(color)) => tag.with_color(color),
                    Some(None) => tag.with_color(crate::domain::DEFAULT_TAG_COLOR),
                    None => tag,
                })
            }
            (name, color) => Err(ValidationError::combine([name.err(), color.err()])),
        }
    }
}

/// Response DTO for a tag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    /// Tag ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Palette color token.
    pub color: String,
    /// Owner ID.
    pub user: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.tag_id.to_string(),
            name: tag.name.clone(),
            color: tag.color.clone(),
            user: tag.owner.to_string(),
            created_at: tag.created_at.to_rfc3339(),
        }
    }
}

// =============================================================================
// Task DTOs
// =============================================================================

/// A checklist item as sent by clients. Items without a valid `_id` get a
/// fresh one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChecklistItemRequest {
    /// Existing item ID, if any.
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Item text.
    pub text: String,
    /// Whether the item is ticked.
    pub completed: bool,
}

/// Request DTO for creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Title of the task.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Status wire name. Defaults to `pending`.
    pub status: Option<String>,
    /// Project ID. Empty means none.
    pub project: Option<String>,
    /// Tag IDs.
    pub tags: Vec<String>,
    /// Checklist items.
    pub checklist: Vec<ChecklistItemRequest>,
    /// Due date, RFC 3339 or `YYYY-MM-DD`. Empty means none.
    pub due_date: Option<String>,
    /// Image, usually a data URL.
    pub image: Option<String>,
}

impl CreateTaskRequest {
    /// Builds the task for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing each invalid field.
    pub fn into_task(
        self,
        task_id: TaskId,
        owner: UserId,
        created_at: Timestamp,
    ) -> Result<Task, ValidationError> {
        let status = self
            .status
            .as_deref()
            .map(validate_status)
            .transpose()
            .map(Option::unwrap_or_default);

        match (
            validate_title(&self.title),
            validate_description(self.description.as_deref()),
            status,
            parse_project_reference(self.project.as_deref()),
            parse_tag_references(&self.tags),
            validate_checklist(&self.checklist),
            parse_due_date(self.due_date.as_deref()),
        ) {
            (
                Ok(title),
                Ok(description),
                Ok(status),
                Ok(project),
                Ok(tags),
                Ok(checklist),
                Ok(due_date),
            ) => Ok(Task::new(task_id, owner, title, created_at)
                .with_description(description)
                .with_status(status)
                .with_project(project)
                .with_tags(tags)
                .with_checklist(checklist)
                .with_due_date(due_date)
                .with_image(normalize_image(self.image))),
            (title, description, status, project, tags, checklist, due_date) => {
                Err(ValidationError::combine([
                    title.err(),
                    description.err(),
                    status.err(),
                    project.err(),
                    tags.err(),
                    checklist.err(),
                    due_date.err(),
                ]))
            }
        }
    }
}

/// Request DTO for updating a task.
///
/// Absent fields are left unchanged. An explicit `null` clears
/// `description`, `project`, `dueDate` and `image`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: Option<String>,
    /// New description, or `null` to clear.
    #[serde(deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    /// New status wire name.
    pub status: Option<String>,
    /// New project ID, or `null`/empty to detach.
    #[serde(deserialize_with = "nullable")]
    pub project: Option<Option<String>>,
    /// Replacement tag IDs.
    pub tags: Option<Vec<String>>,
    /// Replacement checklist.
    pub checklist: Option<Vec<ChecklistItemRequest>>,
    /// New due date, or `null`/empty to clear.
    #[serde(deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    /// New image, or `null` to clear.
    #[serde(deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
}

impl UpdateTaskRequest {
    /// Applies the provided fields to `task`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` listing each invalid field.
    pub fn apply(self, task: Task) -> Result<Task, ValidationError> {
        let title = self.title.as_deref().map(validate_title).transpose();
        let description = self
            .description
            .map(|description| validate_description(description.as_deref()))
            .transpose();
        let status = self.status.as_deref().map(validate_status).transpose();
        let project = self
            .project
            .map(|project| parse_project_reference(project.as_deref()))
            .transpose();
        let tags = self
            .tags
            .as_deref()
            .map(parse_tag_references)
            .transpose();
        let checklist = self
            .checklist
            .as_deref()
            .map(validate_checklist)
            .transpose();
        let due_date = self
            .due_date
            .map(|due_date| parse_due_date(due_date.as_deref()))
            .transpose();

        match (title, description, status, project, tags, checklist, due_date) {
            (
                Ok(title),
                Ok(description),
                Ok(status),
                Ok(project),
                Ok(tags),
                Ok(checklist),
                Ok(due_date),
            ) => {
                let mut task = task;
                if let Some(title) = title {
                    task = task.with_title(title);
                }
                if let Some(description) = description {
                    task = task.with_description(description);
                }
                if let Some(status) = status {
                    task = task.with_status(status);
                }
                if let Some(project) = project {
                    task = task.with_project(project);
                }
                if let Some(tags) = tags {
                    task = task.with_tags(tags);
                }
                if let Some(checklist) = checklist {
                    task = task.with_checklist(checklist);
                }
                if let Some(due_date) = due_date {
                    task = task.with_due_date(due_date);
                }
                if let Some(image) = self.image {
                    task = task.with_image(normalize_image(image));
                }
                Ok(task)
            }
            (title, description, status, project, tags, checklist, due_date) => {
                Err(ValidationError::combine([
                    title.err(),
                    description.err(),
                    status.err(),
                    project.err(),
                    tags.err(),
                    checklist.err(),
                    due_date.err(),
                ]))
            }
        }
    }
}

/// Request DTO for `POST /api/tasks/{id}/move`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveTaskRequest {
    /// Where the card was picked up.
    pub source: DragLocation,
    /// Where it was dropped; `null` when dropped outside the board.
    #[serde(default)]
    pub destination: Option<DragLocation>,
}

/// Response DTO for a checklist item.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItemResponse {
    /// Item ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Item text.
    pub text: String,
    /// Whether the item is ticked.
    pub completed: bool,
}

impl From<&ChecklistItem> for ChecklistItemResponse {
    fn from(item: &ChecklistItem) -> Self {
        Self {
            id: item.item_id.to_string(),
            text: item.text.clone(),
            completed: item.completed,
        }
    }
}

/// Response DTO for a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Title of the task.
    pub title: String,
    /// Description of the task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Project ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Tag IDs.
    pub tags: Vec<String>,
    /// Checklist items.
    pub checklist: Vec<ChecklistItemResponse>,
    /// Due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Image data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Owner ID.
    pub user: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.task_id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            project: task.project.as_ref().map(ToString::to_string),
            tags: task.tags.iter().map(ToString::to_string).collect(),
            checklist: task.checklist.iter().map(ChecklistItemResponse::from).collect(),
            due_date: task.due_date.as_ref().map(Timestamp::to_rfc3339),
            image: task.image.clone(),
            user: task.owner.to_string(),
            created_at: task.created_at.to_rfc3339(),
        }
    }
}

/// Response DTO for the status board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    /// `pending` column.
    pub pending: Vec<TaskResponse>,
    /// `in-progress` column.
    pub in_progress: Vec<TaskResponse>,
    /// `completed` column.
    pub completed: Vec<TaskResponse>,
}

impl From<&TaskBoard> for BoardResponse {
    fn from(board: &TaskBoard) -> Self {
        let column = |tasks: &[Task]| tasks.iter().map(TaskResponse::from).collect();
        Self {
            pending: column(&board.pending),
            in_progress: column(&board.in_progress),
            completed: column(&board.completed),
        }
    }
}

/// Query parameters for `GET /api/tasks` and `GET /api/tasks/board`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    /// Title substring.
    pub search: Option<String>,
    /// Project ID.
    pub project: Option<String>,
    /// Comma-separated tag IDs.
    pub tags: Option<String>,
    /// `all`, `pending`, `in-progress` or `completed`.
    pub status: Option<String>,
}

impl TaskListQuery {
    /// Converts the query into filter criteria.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for malformed IDs or an unknown status.
    pub fn into_filters(self) -> Result<ActiveFilters, ValidationError> {
        let tags: Vec<String> = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        let status = self
            .status
            .as_deref()
            .map(|status| {
                status
                    .parse::<StatusFilter>()
                    .map_err(|message| ValidationError::single("status", message))
            })
            .transpose()
            .map(Option::unwrap_or_default);

        match (
            parse_project_reference(self.project.as_deref()),
            parse_tag_references(&tags),
            status,
        ) {
            (Ok(project), Ok(tags), Ok(status)) => {
                let mut filters = ActiveFilters::new();
                filters.set_search(self.search.unwrap_or_default());
                filters.set_project(project);
                for tag in tags {
                    filters.add_tag(tag);
                }
                filters.set_status(status);
                Ok(filters)
            }
            (project, tags, status) => Err(ValidationError::combine([
                project.err(),
                tags.err(),
                status.err(),
            ])),
        }
    }
}

// =============================================================================
// Generic DTOs
// =============================================================================

/// Empty JSON object.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

/// Response DTO for deletions: `{ "success": true, "data": {} }`.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    /// Always `true`.
    pub success: bool,
    /// Always empty.
    pub data: Empty,
}

impl DeletedResponse {
    /// Creates the response.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success: true,
            data: Empty {},
        }
    }
}

impl Default for DeletedResponse {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Validation
// =============================================================================

fn required_text(
    field: &str,
    label: &str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::single(field, format!("{label} is required")));
    }
    if value.chars().count() > max {
        return Err(ValidationError::single(
            field,
            format!("{label} must not exceed {max} characters"),
        ));
    }
    Ok(value.to_string())
}

/// Validates a task title: required, at most 255 characters after trimming.
///
/// # Errors
///
/// Returns `ValidationError` on the `title` field.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    required_text("title", "Title", title, MAX_TITLE_LENGTH)
}

/// Validates a task description. Blank descriptions become `None`.
///
/// # Errors
///
/// Returns `ValidationError` if longer than 1000 characters.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(description) = description.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::single(
            "description",
            format!("Description must not exceed {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }
    Ok(Some(description.to_string()))
}

/// Parses a status wire name.
///
/// # Errors
///
/// Returns `ValidationError` on the `status` field for unknown names.
pub fn validate_status(status: &str) -> Result<TaskStatus, ValidationError> {
    status
        .parse()
        .map_err(|message: String| ValidationError::single("status", message))
}

/// Validates a project name.
///
/// # Errors
///
/// Returns `ValidationError` on the `name` field.
pub fn validate_project_name(name: &str) -> Result<String, ValidationError> {
    required_text("name", "Name", name, MAX_PROJECT_NAME_LENGTH)
}

/// Validates a tag name.
///
/// # Errors
///
/// Returns `ValidationError` on the `name` field.
pub fn validate_tag_name(name: &str) -> Result<String, ValidationError> {
    required_text("name", "Name", name, MAX_TAG_NAME_LENGTH)
}

/// Validates a tag color. Blank means "use the default" (`None`).
///
/// # Errors
///
/// Returns `ValidationError` if longer than 30 characters.
pub fn validate_tag_color(color: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(color) = color.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if color.chars().count() > MAX_TAG_COLOR_LENGTH {
        return Err(ValidationError::single(
            "color",
            format!("Color must not exceed {MAX_TAG_COLOR_LENGTH} characters"),
        ));
    }
    Ok(Some(color.to_string()))
}

/// Validates and normalizes an email address.
///
/// # Errors
///
/// Returns `ValidationError` on the `email` field.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ValidationError::single("email", "Email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(ValidationError::single("email", "Email is invalid")),
    }
}

/// Checks the minimum password length.
///
/// # Errors
///
/// Returns `ValidationError` on the `password` field.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::single(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn parse_project_reference(project: Option<&str>) -> Result<Option<ProjectId>, ValidationError> {
    match project.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => ProjectId::parse(value)
            .map(Some)
            .map_err(|_| ValidationError::single("project", "Invalid project id")),
    }
}

fn parse_tag_references(tags: &[String]) -> Result<Vec<TagId>, ValidationError> {
    let (parsed, errors): (Vec<_>, Vec<_>) = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| {
            TagId::parse(tag)
                .map_err(|_| FieldError::new(format!("tags[{index}]"), "Invalid tag id"))
        })
        .partition(Result::is_ok);

    if errors.is_empty() {
        Ok(parsed.into_iter().filter_map(Result::ok).collect())
    } else {
        Err(ValidationError::new(
            errors.into_iter().filter_map(Result::err).collect(),
        ))
    }
}

fn validate_checklist(items: &[ChecklistItemRequest]) -> Result<Vec<ChecklistItem>, ValidationError> {
    let mut errors = ValidationError::default();
    let mut checklist = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let item_id = match item.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            None => Some(ChecklistItemId::generate()),
            Some(id) => ChecklistItemId::parse(id).ok().or_else(|| {
                errors.push(format!("checklist[{index}]._id"), "Invalid checklist item id");
                None
            }),
        };
        let text = required_text(
            &format!("checklist[{index}].text"),
            "Checklist item text",
            &item.text,
            MAX_CHECKLIST_TEXT_LENGTH,
        )
        .map_err(|error| errors.errors.extend(error.errors))
        .ok();

        if let (Some(item_id), Some(text)) = (item_id, text) {
            checklist.push(ChecklistItem::new(item_id, text).with_completed(item.completed));
        }
    }

    errors.into_result(checklist)
}

fn parse_due_date(due_date: Option<&str>) -> Result<Option<Timestamp>, ValidationError> {
    match due_date.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => Timestamp::parse_flexible(value).map(Some).ok_or_else(|| {
            ValidationError::single("dueDate", "Due date must be RFC 3339 or YYYY-MM-DD")
        }),
    }
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image.filter(|value| !value.trim().is_empty())
}

// =============================================================================
// Tests
// =============================================================================
