// handlers/public/forms.rs - Respondent endpoints under /forms/:form_id

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::SessionId;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::PublicForm;

#[derive(Debug, Serialize)]
pub struct IssuedSession {
    pub session_id: SessionId,
}

#[derive(Debug, Deserialize)]
pub struct ResponseRequest {
    pub session_id: String,
    pub element_id: Uuid,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct Recorded {
    pub session_id: SessionId,
    pub element_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub session_id: SessionId,
    pub completed: bool,
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_field("session_id", format!("Invalid session id: {}", raw)))
}

/// GET /forms/:form_id - Form with its elements, in display order
pub async fn form_get(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PublicForm> {
    let Path(form_id) = path?;
    let form = state.services.workspaces.get_form_elements(form_id).await?;
    Ok(ApiResponse::success(form))
}

/// POST /forms/:form_id/session - Start a respondent session (counts a view)
pub async fn session_post(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<IssuedSession> {
    let Path(form_id) = path?;
    let session_id = state.services.responses.issue_session(form_id).await?;
    Ok(ApiResponse::created(IssuedSession { session_id }))
}

/**
 * POST /forms/:form_id/responses - Record one answer
 *
 * Expected Input:
 * ```json
 * { "session_id": "0190...", "element_id": "7c1e...", "value": "Ada" }
 * ```
 *
 * Answering the same element again overwrites the earlier value. Answers to a
 * submitted session are rejected with 409.
 */
pub async fn responses_post(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ResponseRequest>, JsonRejection>,
) -> ApiResult<Recorded> {
    let Path(form_id) = path?;
    let Json(body) = payload?;
    let session_id = parse_session_id(&body.session_id)?;

    state
        .services
        .responses
        .record_response(session_id, form_id, body.element_id, body.value)
        .await?;

    Ok(ApiResponse::success(Recorded {
        session_id,
        element_id: body.element_id,
    }))
}

/// POST /forms/:form_id/submit/:session_id - Complete the session's entry
///
/// 422 while a required question is unanswered, 409 once already submitted.
pub async fn submit_post(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
) -> ApiResult<Submitted> {
    let Path((form_id, raw_session)) = path?;
    let session_id = parse_session_id(&raw_session)?;

    state.services.responses.submit_form(session_id, form_id).await?;

    Ok(ApiResponse::success(Submitted {
        session_id,
        completed: true,
    }))
}
