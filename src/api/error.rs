//! API error handling.
//!
//! Every handler returns `Result<_, ApiErrorResponse>`; lower-layer errors
//! convert into it with `?`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::domain::AccessError;
use crate::infrastructure::RepositoryError;

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional field-level errors for validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error with field-level details.
    #[must_use]
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new(code, message))
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation(message, details),
        )
    }

    /// Creates a 401 response for a missing or invalid credential.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHORIZED", message),
        )
    }

    /// Creates a 401 response for a record owned by someone else.
    #[must_use]
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("NOT_AUTHORIZED", message),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => Self::not_found(message),
            // Internal errors should not expose details to clients.
            RepositoryError::Duplicate(_)
            | RepositoryError::DatabaseError(_)
            | RepositoryError::SerializationError(_) => {
                tracing::error!(%error, "Repository failure");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

impl From<AccessError> for ApiErrorResponse {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::NotFound { .. } => Self::not_found(error.to_string()),
            AccessError::NotOwner { .. } => Self::not_authorized(error.to_string()),
        }
    }
}

impl From<AuthError> for ApiErrorResponse {
    fn from(error: AuthError) -> Self {
        if error.is_rejection() {
            tracing::debug!(%error, "Rejected credential");
            Self::unauthorized(error.to_string())
        } else {
            tracing::error!(%error, "Credential processing failed");
            Self::internal_error("An internal error occurred")
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Validation error type for request validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    /// Field-level errors.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    /// Gathers the errors of several independent validations.
    #[must_use]
    pub fn combine(parts: impl IntoIterator<Item = Option<Self>>) -> Self {
        Self::new(parts.into_iter().flatten().flat_map(|part| part.errors).collect())
    }

    /// Records one more field error.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `Ok(value)` if nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error("Validation failed", error.errors)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_api_error_validation() {
        let details = vec![FieldError::new("title", "Title is required")];
        let error = ApiError::validation("Validation failed", details);
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert_eq!(error.details.unwrap().len(), 1);
    }

    #[rstest]
    fn test_api_error_omits_empty_details() {
        let json = serde_json::to_value(ApiError::new("NOT_FOUND", "Task not found")).unwrap();
        assert!(json.get("details").is_none());
    }

    #[rstest]
    #[case(RepositoryError::NotFound("x".to_string()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(
        RepositoryError::DatabaseError("boom".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR"
    )]
    #[case(
        RepositoryError::Duplicate("users.email".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR"
    )]
    fn test_from_repository_error(
        #[case] error: RepositoryError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiErrorResponse::from(error);
        assert_eq!(response.status, status);
        assert_eq!(response.error.code, code);
    }

    #[rstest]
    fn test_internal_repository_error_hides_details() {
        let response =
            ApiErrorResponse::from(RepositoryError::DatabaseError("password=hunter2".to_string()));
        assert!(!response.error.message.contains("hunter2"));
    }

    #[rstest]
    fn test_from_access_error() {
        let response = ApiErrorResponse::from(AccessError::NotOwner { kind: "Task" });
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error.code, "NOT_AUTHORIZED");

        let response = ApiErrorResponse::from(AccessError::NotFound { kind: "Tag" });
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.message, "Tag not found");
    }

    #[rstest]
    #[case(AuthError::MissingCredentials, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::Expired, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::UnknownUser, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::Internal("rng".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_from_auth_error(#[case] error: AuthError, #[case] status: StatusCode) {
        assert_eq!(ApiErrorResponse::from(error).status, status);
    }

    #[rstest]
    fn test_validation_error_combine_keeps_every_field() {
        let combined = ValidationError::combine([
            Some(ValidationError::single("title", "Title is required")),
            None,
            Some(ValidationError::new(vec![
                FieldError::new("tags[0]", "Invalid id"),
                FieldError::new("tags[2]", "Invalid id"),
            ])),
        ]);

        let fields: Vec<&str> = combined.errors.iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "tags[0]", "tags[2]"]);
    }

    #[rstest]
    fn test_validation_error_into_result() {
        let mut errors = ValidationError::default();
        assert_eq!(errors.clone().into_result(1).unwrap(), 1);

        errors.push("name", "Name is required");
        let response = ApiErrorResponse::from(errors.into_result(1).unwrap_err());
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.details.unwrap()[0].field, "name");
    }
}
