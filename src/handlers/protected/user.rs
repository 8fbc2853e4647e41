// handlers/protected/user.rs - The authenticated user's own profile

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Theme, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

/// GET /api/user
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = state.services.accounts.profile(auth_user.user_id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/user/profile - Omitted fields keep their current value
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = payload?;
    let user = state
        .services
        .accounts
        .update_profile(auth_user.user_id, body.username.as_deref(), body.email.as_deref())
        .await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/user/theme - `{"theme": "dark" | "light"}`
pub async fn theme_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ThemeRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = payload?;
    let theme: Theme = body.theme.parse().map_err(|e: String| ApiError::invalid_field("theme", e))?;

    let user = state.services.accounts.update_theme(auth_user.user_id, theme).await?;
    Ok(ApiResponse::success(user))
}
