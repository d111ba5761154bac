//! Dashboard routes: the rendered state of the admin page.

use axum::{extract::State, Json};

use crate::errors::ApiResponse;
use crate::views::PageSnapshot;
use crate::AppState;

/// GET /api/v1/dashboard: current page state, loading the page on first use.
pub async fn snapshot(State(state): State<AppState>) -> Json<ApiResponse<PageSnapshot>> {
    let page = state.pages.current().await;
    ApiResponse::success(page.snapshot())
}

/// POST /api/v1/dashboard/reload: discard the page and load a fresh one.
pub async fn reload(State(state): State<AppState>) -> Json<ApiResponse<PageSnapshot>> {
    let page = state.pages.reload().await;
    ApiResponse::success(page.snapshot())
}
