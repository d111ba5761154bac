//! Authentication routes: sign-in and logout.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::models::account::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthUser>>, AppError> {
    body.validate()?;
    let user = state.gateway.sign_in(&body.email, &body.password).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/v1/auth/logout: signs out and sends the open page to sign-in.
pub async fn logout(State(state): State<AppState>) -> Json<ApiResponse<&'static str>> {
    state.pages.logout().await;
    ApiResponse::success("Logged out successfully")
}
