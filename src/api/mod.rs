//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
#[cfg(feature = "maintenance")]
pub mod maintenance;
pub mod projects;
pub mod routes;
pub mod tags;
pub mod tasks;

pub use dto::{
    AuthResponse, BoardResponse, CreateProjectRequest, CreateTagRequest, CreateTaskRequest,
    DeletedResponse, MoveTaskRequest, ProjectResponse, TagResponse, TaskListQuery, TaskResponse,
    UpdateProjectRequest, UpdateTagRequest, UpdateTaskRequest, UserResponse,
};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{AppConfig, AppState, HealthResponse, health_check, root};
pub use routes::router;
