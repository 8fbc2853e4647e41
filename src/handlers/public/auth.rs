// handlers/public/auth.rs - POST /auth/signup and POST /auth/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginSession;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/**
 * POST /auth/signup - Create an account and its workspace
 *
 * Expected Input:
 * ```json
 * { "username": "ada", "email": "ada@example.com", "password": "secret1" }
 * ```
 *
 * Responds 201 with the new user. The user's own workspace is created in the
 * same step and its id is in `workspace_id`.
 */
pub async fn signup_post(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = payload?;
    let user = state
        .services
        .accounts
        .signup(&body.username, &body.email, &body.password)
        .await?;
    Ok(ApiResponse::created(user))
}

/**
 * POST /auth/login - Exchange credentials for a JWT
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": { "token": "eyJhbGciOiJIUzI1NiI...", "expires_in": 604800, "user": { ... } }
 * }
 * ```
 *
 * Unknown email and wrong password both answer 401 with the same message.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginSession> {
    let Json(body) = payload?;
    let session = state.services.accounts.login(&body.email, &body.password).await?;
    Ok(ApiResponse::success(session))
}
