//! Common test helpers for integration tests.
//!
//! Builds an in-memory `AppState` and drives the full router, middleware
//! included, with `tower::ServiceExt::oneshot`.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{create_test_app_state, register_user, send};
//! ```
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tasker::api::{AppConfig, AppState, router};
use tasker::auth::TokenService;
use tasker::config::AuthConfig;
use tasker::infrastructure::Repositories;

/// Signing key shared by every integration test.
pub const TEST_SECRET: &str = "integration-test-secret-key";

/// Password used by [`register_user`].
pub const TEST_PASSWORD: &str = "correct horse";

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` with in-memory repositories.
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_config(AppConfig::default())
}

/// Creates a test `AppState` with custom router configuration.
pub fn create_test_app_state_with_config(config: AppConfig) -> AppState {
    AppState::with_config(Repositories::in_memory(), test_tokens(), config)
}

/// The token service the test state signs with.
pub fn test_tokens() -> TokenService {
    let auth = AuthConfig::new(TEST_SECRET, 30).expect("test secret should be accepted");
    TokenService::new(&auth)
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Status and decoded JSON body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `code` of an error body.
    pub fn error_code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    /// Field names listed in a validation error body.
    pub fn error_fields(&self) -> Vec<String> {
        self.body["details"]
            .as_array()
            .map(|details| {
                details
                    .iter()
                    .filter_map(|detail| detail["field"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Sends one request through a freshly built router.
pub async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = router(state.clone())
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };

    TestResponse { status, body }
}

pub async fn get(state: &AppState, uri: &str, token: &str) -> TestResponse {
    send(state, Method::GET, uri, Some(token), None).await
}

pub async fn post(state: &AppState, uri: &str, token: &str, body: Value) -> TestResponse {
    send(state, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put(state: &AppState, uri: &str, token: &str, body: Value) -> TestResponse {
    send(state, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(state: &AppState, uri: &str, token: &str) -> TestResponse {
    send(state, Method::DELETE, uri, Some(token), None).await
}

// =============================================================================
// Fixture Helpers
// =============================================================================

/// A registered user's token and id.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub token: String,
    pub id: String,
}

/// Registers a user with [`TEST_PASSWORD`] and returns its session.
pub async fn register_user(state: &AppState, name: &str, email: &str) -> TestUser {
    let response = send(
        state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(
        response.status,
        StatusCode::CREATED,
        "registration failed: {}",
        response.body
    );

    TestUser {
        token: response.body["token"]
            .as_str()
            .expect("token should be a string")
            .to_string(),
        id: response.body["user"]["id"]
            .as_str()
            .expect("user id should be a string")
            .to_string(),
    }
}

/// Creates a project and returns its id.
pub async fn create_project(state: &AppState, user: &TestUser, name: &str) -> String {
    let response = post(state, "/api/projects", &user.token, json!({ "name": name })).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    record_id(&response.body)
}

/// Creates a tag and returns its id.
pub async fn create_tag(state: &AppState, user: &TestUser, name: &str) -> String {
    let response = post(state, "/api/tags", &user.token, json!({ "name": name })).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    record_id(&response.body)
}

/// Creates a task from a request body and returns the created task.
pub async fn create_task(state: &AppState, user: &TestUser, body: Value) -> Value {
    let response = post(state, "/api/tasks", &user.token, body).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

/// The `_id` of a record body.
pub fn record_id(body: &Value) -> String {
    body["_id"]
        .as_str()
        .expect("record should carry an _id")
        .to_string()
}

/// Titles of a task list body, in order.
pub fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("body should be an array")
        .iter()
        .filter_map(|task| task["title"].as_str().map(str::to_string))
        .collect()
}
