//! Registration, login and the current-user endpoint.

use axum::{Json, extract::State, http::StatusCode};

use super::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use super::error::{ApiError, ApiErrorResponse};
use super::handlers::AppState;
use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::domain::{Timestamp, User, UserId};
use crate::infrastructure::RepositoryError;

fn user_exists() -> ApiErrorResponse {
    ApiErrorResponse::bad_request("USER_EXISTS", "A user with this email already exists")
}

fn invalid_credentials() -> ApiErrorResponse {
    ApiErrorResponse::new(
        StatusCode::UNAUTHORIZED,
        ApiError::new("INVALID_CREDENTIALS", "Invalid credentials"),
    )
}

/// Runs CPU-heavy credential work off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiErrorResponse>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|error| {
        tracing::error!(%error, "Blocking credential task failed");
        ApiErrorResponse::internal_error("An internal error occurred")
    })
}

/// Registers a new account and signs it in.
///
/// # Request Body
///
/// ```json
/// { "name": "Ana", "email": "ana@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// - **201 Created**: `{ token, user }`
/// - **400 Bad Request**: `VALIDATION_ERROR` or `USER_EXISTS`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for invalid input, a taken email, or a
/// storage failure.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiErrorResponse> {
    let registration = request.validate()?;

    if state
        .user_repository
        .find_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(user_exists());
    }

    let password = registration.password;
    let password_hash = run_blocking(move || hash_password(&password)).await??;

    let user = User::new(
        UserId::generate(),
        registration.name,
        &registration.email,
        password_hash,
        Timestamp::now(),
    );

    // The unique index still guards against two concurrent registrations.
    match state.user_repository.insert(&user).await {
        Ok(()) => {}
        Err(RepositoryError::Duplicate(_)) => return Err(user_exists()),
        Err(error) => return Err(error.into()),
    }

    let token = state.tokens.issue(&user.user_id)?;
    tracing::info!(user_id = %user.user_id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// Exchanges email and password for a token.
///
/// # Response
///
/// - **200 OK**: `{ token, user }`
/// - **400 Bad Request**: missing email or password
/// - **401 Unauthorized**: `INVALID_CREDENTIALS`, for an unknown email and a
///   wrong password alike
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] as listed above, or 500 on storage failure.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiErrorResponse> {
    let email = request.validate()?;

    let Some(user) = state.user_repository.find_by_email(&email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(invalid_credentials());
    };

    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let matches = run_blocking(move || verify_password(&password, &stored_hash)).await??;
    if !matches {
        tracing::debug!(user_id = %user.user_id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(&user.user_id)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Returns the authenticated user.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
