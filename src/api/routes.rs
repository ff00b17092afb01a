//! Router assembly.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{login, me, register};
use super::handlers::{AppState, health_check, root};
use super::projects::{create_project, delete_project, get_project, list_projects, update_project};
use super::tags::{create_tag, delete_tag, get_tag, list_tags, update_tag};
use super::tasks::{
    create_task, delete_task, get_task, list_tasks, move_task, task_board, update_task,
};

/// Builds the full application router with its middleware stack.
///
/// Resource routes live under `/api`; `/` and `/health` are public.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // Tasks
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/board", get(task_board))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/move", post(move_task))
        // Projects
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        // Tags
        .route("/tags", get(list_tags).post(create_tag))
        .route(
            "/tags/{id}",
            get(get_tag).put(update_tag).delete(delete_tag),
        );

    // Feature flag (compile-time) + ENABLE_CLEAR_DATABASE (runtime) double-gate
    #[cfg(feature = "maintenance")]
    let api = if state.config.enable_clear_database {
        tracing::warn!("Database reset endpoint enabled");
        api.route(
            "/clear-database",
            axum::routing::delete(super::maintenance::clear_database),
        )
    } else {
        api
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
