//! Route definitions for the reportdash API.

pub mod auth;
pub mod dashboard;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// Build the application router with every route mounted.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::snapshot))
        .route("/dashboard/reload", post(dashboard::reload));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", auth_routes)
        .nest("/api/v1", dashboard_routes)
        .with_state(state)
}
