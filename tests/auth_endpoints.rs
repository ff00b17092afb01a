//! Integration tests for registration, login and the bearer guard.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rstest::rstest;
use serde_json::json;

use common::{TEST_PASSWORD, create_test_app_state, get, register_user, send, test_tokens};
use tasker::domain::UserId;

// =============================================================================
// POST /api/auth/register
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_register_returns_token_and_user() {
    let state = create_test_app_state();

    let response = send(
        &state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ana", "email": " Ana@Example.com ", "password": "secret1" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["token"].as_str().is_some_and(|token| !token.is_empty()));
    assert_eq!(response.body["user"]["name"], "Ana");
    assert_eq!(response.body["user"]["email"], "ana@example.com");
    assert!(response.body["user"]["createdAt"].is_string());
    assert!(response.body["user"].get("password").is_none());
    assert!(response.body["user"].get("passwordHash").is_none());
}

#[rstest]
#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let state = create_test_app_state();
    register_user(&state, "Ana", "ana@example.com").await;

    let response = send(
        &state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Other", "email": "ANA@example.com", "password": "secret1" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "USER_EXISTS");
}

#[rstest]
#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let state = create_test_app_state();

    let response = send(
        &state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "", "email": "nope", "password": "123" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    let fields = response.error_fields();
    for field in ["name", "email", "password"] {
        assert!(fields.iter().any(|name| name == field), "missing {field} in {fields:?}");
    }
}

// =============================================================================
// POST /api/auth/login
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_login_with_correct_password() {
    let state = create_test_app_state();
    let user = register_user(&state, "Ana", "ana@example.com").await;

    let response = send(
        &state,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ANA@example.com", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["id"], user.id.as_str());
    let token = response.body["token"].as_str().expect("token");

    let me = get(&state, "/api/auth/me", token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], user.id.as_str());
}

#[rstest]
#[case::wrong_password("ana@example.com", "not the password")]
#[case::unknown_email("bob@example.com", TEST_PASSWORD)]
#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly(
    #[case] email: &str,
    #[case] password: &str,
) {
    let state = create_test_app_state();
    register_user(&state, "Ana", "ana@example.com").await;

    let response = send(
        &state,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_CREDENTIALS");
}

#[rstest]
#[tokio::test]
async fn test_login_requires_both_fields() {
    let state = create_test_app_state();

    let response = send(
        &state,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "", "password": "" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

// =============================================================================
// Bearer guard
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let state = create_test_app_state();

    let response = send(&state, Method::GET, "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[rstest]
#[case::garbage("not-a-token")]
#[case::two_segments("abc.def")]
#[tokio::test]
async fn test_me_with_malformed_token_is_unauthorized(#[case] token: &str) {
    let state = create_test_app_state();

    let response = get(&state, "/api/auth/me", token).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_me_with_expired_token_is_unauthorized() {
    let state = create_test_app_state();
    let user = register_user(&state, "Ana", "ana@example.com").await;
    let user_id = UserId::parse(&user.id).expect("registered id");

    let stale = test_tokens()
        .issue_at(&user_id, Utc::now() - Duration::days(31))
        .expect("token should sign");

    let response = get(&state, "/api/auth/me", &stale).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_me_with_token_for_unknown_user_is_unauthorized() {
    let state = create_test_app_state();
    let token = test_tokens()
        .issue(&UserId::generate())
        .expect("token should sign");

    let response = get(&state, "/api/auth/me", &token).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_resource_routes_require_authentication() {
    let state = create_test_app_state();

    for uri in ["/api/tasks", "/api/tasks/board", "/api/projects", "/api/tags"] {
        let response = send(&state, Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

// =============================================================================
// Public endpoints
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_root_and_health_are_public() {
    let state = create_test_app_state();

    let root = send(&state, Method::GET, "/", None, None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["message"], "Tasker API is running");

    let health = send(&state, Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "healthy");
}
