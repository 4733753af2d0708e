use crate::handlers;
use crate::middleware;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Account administration requires the admin role.
    let admin_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/:id",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    // Everything else behind a valid bearer token.
    let protected_routes = Router::new()
        .route(
            "/api/members",
            get(handlers::members::list_members).post(handlers::members::create_member),
        )
        .route(
            "/api/members/:id",
            put(handlers::members::update_member).delete(handlers::members::delete_member),
        )
        .route(
            "/api/departments",
            get(handlers::departments::list_departments)
                .post(handlers::departments::create_department),
        )
        .route(
            "/api/departments/:id",
            put(handlers::departments::update_department)
                .delete(handlers::departments::delete_department),
        )
        .route(
            "/api/departments/:id/members",
            get(handlers::departments::department_members)
                .put(handlers::departments::sync_department_members),
        )
        .route(
            "/api/cells",
            get(handlers::cells::list_cells).post(handlers::cells::create_cell),
        )
        .route(
            "/api/cells/:id",
            put(handlers::cells::update_cell).delete(handlers::cells::delete_cell),
        )
        .route("/api/users/me", get(handlers::users::me))
        .route(
            "/api/users/change-password",
            put(handlers::users::change_password),
        )
        .route("/api/summary", get(handlers::summary::summary))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        // Public endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register))
        .merge(admin_routes)
        .merge(protected_routes)
        .with_state(state)
}
