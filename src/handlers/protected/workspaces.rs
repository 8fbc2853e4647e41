// handlers/protected/workspaces.rs - Workspace overview and sharing

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Extension, Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{AccessLevel, WorkspaceGrant};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{WorkspaceOverview, WorkspaceSummary};

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub email: String,
    pub access_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareLinkRequest {
    pub workspace_id: Uuid,
    pub access_level: String,
}

pub(crate) fn parse_access_level(raw: &str) -> Result<AccessLevel, ApiError> {
    raw.parse().map_err(|e: String| ApiError::invalid_field("access_level", e))
}

/// GET /api/workspaces - Own workspace first, then shared ones
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<WorkspaceSummary>> {
    let workspaces = state.services.workspaces.list_workspaces(auth_user.user_id).await?;
    Ok(ApiResponse::success(workspaces))
}

/// GET /api/workspaces/:workspace_id - Folder and top-level form names
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<WorkspaceOverview> {
    let Path(workspace_id) = path?;
    let overview = state
        .services
        .workspaces
        .get_workspace(auth_user.user_id, workspace_id)
        .await?;
    Ok(ApiResponse::success(overview))
}

/**
 * POST /api/workspaces/share - Share the caller's own workspace by email
 *
 * Expected Input:
 * ```json
 * { "email": "bob@example.com", "access_level": "view" }
 * ```
 *
 * 404 when nobody has that email, 409 for self-shares and existing grants.
 */
pub async fn share_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ShareRequest>, JsonRejection>,
) -> ApiResult<WorkspaceGrant> {
    let Json(body) = payload?;
    let level = parse_access_level(&body.access_level)?;

    let grant = state
        .services
        .sharing
        .share(auth_user.user_id, &body.email, level)
        .await?;
    Ok(ApiResponse::created(grant))
}

/// POST /api/workspaces/share/link - Redeem a share link for the caller
pub async fn share_link_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ShareLinkRequest>, JsonRejection>,
) -> ApiResult<WorkspaceGrant> {
    let Json(body) = payload?;
    let level = parse_access_level(&body.access_level)?;

    let grant = state
        .services
        .sharing
        .share_via_link(auth_user.user_id, body.workspace_id, level)
        .await?;
    Ok(ApiResponse::created(grant))
}
