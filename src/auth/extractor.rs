//! The `CurrentUser` extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::AuthError;
use crate::api::{ApiErrorResponse, AppState};
use crate::domain::User;

/// The user a request is authenticated as.
///
/// Taking this as a handler argument guards the route: requests without a
/// valid `Authorization: Bearer <token>` header, or whose token names a
/// user that no longer exists, are rejected with 401 before the handler
/// runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::InvalidScheme)?;

        let token = bearer_token(header)?;
        let user_id = state.tokens.verify(token)?.user_id()?;

        let user = state
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        Ok(Self(user))
    }
}

/// Extracts the token from a `Bearer` authorization value.
///
/// # Errors
///
/// Returns `AuthError::InvalidScheme` for other schemes and
/// `AuthError::MissingCredentials` for an empty token.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}
