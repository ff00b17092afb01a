//! Integration tests for the database reset endpoint.

#![cfg(feature = "maintenance")]

mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::json;

use common::{
    create_project, create_task, create_test_app_state, create_test_app_state_with_config,
    register_user, send,
};
use tasker::api::AppConfig;

fn enabled() -> AppConfig {
    AppConfig {
        enable_clear_database: true,
        ..AppConfig::default()
    }
}

#[rstest]
#[tokio::test]
async fn test_clear_database_removes_everything() {
    let state = create_test_app_state_with_config(enabled());
    let user = register_user(&state, "Ana", "ana@example.com").await;
    let project = create_project(&state, &user, "Work").await;
    create_task(&state, &user, json!({ "title": "Report", "project": project })).await;

    let response = send(&state, Method::DELETE, "/api/clear-database", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    // The account is gone, so its token no longer authenticates.
    let me = send(&state, Method::GET, "/api/auth/me", Some(&user.token), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_clear_database_is_not_mounted_by_default() {
    let state = create_test_app_state();

    let response = send(&state, Method::DELETE, "/api/clear-database", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
