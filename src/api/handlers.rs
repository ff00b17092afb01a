//! Application state and the unauthenticated service endpoints.

use std::sync::Arc;

use axum::Json;
use serde::Serialize;

use super::error::ApiErrorResponse;
use crate::auth::TokenService;
use crate::config::Settings;
use crate::domain::AccessError;
use crate::infrastructure::{
    ProjectRepository, Repositories, TagRepository, TaskRepository, UserRepository,
};

/// Default maximum request body: 50 MiB, enough for inline image data URLs.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

// =============================================================================
// Application Configuration
// =============================================================================

/// Runtime settings the router needs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Maximum accepted request body, in bytes.
    pub body_limit_bytes: usize,
    /// Whether the database reset endpoint is mounted.
    pub enable_clear_database: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            enable_clear_database: false,
        }
    }
}

impl AppConfig {
    /// Picks the router settings out of the process settings.
    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            body_limit_bytes: settings.server.body_limit_bytes,
            enable_clear_database: settings.enable_clear_database,
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses trait objects (`dyn`) so the storage backend can be chosen at
/// runtime by the `RepositoryFactory`.
#[derive(Clone)]
pub struct AppState {
    /// Registered users.
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    /// Projects.
    pub project_repository: Arc<dyn ProjectRepository + Send + Sync>,
    /// Tags.
    pub tag_repository: Arc<dyn TagRepository + Send + Sync>,
    /// Tasks.
    pub task_repository: Arc<dyn TaskRepository + Send + Sync>,
    /// Session token issuer and verifier.
    pub tokens: TokenService,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Creates state with default configuration.
    #[must_use]
    pub fn new(repositories: Repositories, tokens: TokenService) -> Self {
        Self::with_config(repositories, tokens, AppConfig::default())
    }

    /// Creates state with custom configuration.
    #[must_use]
    pub fn with_config(repositories: Repositories, tokens: TokenService, config: AppConfig) -> Self {
        Self {
            user_repository: repositories.user_repository,
            project_repository: repositories.project_repository,
            tag_repository: repositories.tag_repository,
            task_repository: repositories.task_repository,
            tokens,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Path Parameters
// =============================================================================

/// Parses a record id taken from the URL path.
///
/// A malformed id cannot name an existing record, so it is reported exactly
/// like a missing one.
pub(crate) fn parse_path_id<T>(
    raw: &str,
    kind: &'static str,
    parse: impl FnOnce(&str) -> Result<T, uuid::Error>,
) -> Result<T, ApiErrorResponse> {
    parse(raw).map_err(|_| AccessError::NotFound { kind }.into())
}

// =============================================================================
// GET / and GET /health Handlers
// =============================================================================

/// Plain message body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// The message.
    pub message: &'static str,
}

/// Root endpoint. Confirms the API is reachable.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Tasker API is running",
    })
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// Returns a simple JSON response indicating the service is running.
/// This endpoint can be used by load balancers and orchestration systems
/// to verify service availability.
///
/// # Response
///
/// - **200 OK**: Service is healthy
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use axum::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_root_message() {
        let Json(response) = root().await;
        assert!(response.message.contains("Tasker"));
    }

    #[rstest]
    fn test_parse_path_id_maps_garbage_to_not_found() {
        let error = parse_path_id("not-a-uuid", "Task", TaskId::parse).unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error.message, "Task not found");
    }

    #[rstest]
    fn test_app_config_default_body_limit() {
        assert_eq!(AppConfig::default().body_limit_bytes, 50 * 1024 * 1024);
        assert!(!AppConfig::default().enable_clear_database);
    }
}
