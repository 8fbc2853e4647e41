// handlers/protected/folders.rs - /api/workspaces/:workspace_id/folders[/:folder_id]

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Extension, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Folder;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{FolderDetail, Listing};

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Listing<Folder>> {
    let Path(workspace_id) = path?;
    let folders = state
        .services
        .workspaces
        .list_folders(auth_user.user_id, workspace_id)
        .await?;
    Ok(ApiResponse::success(folders))
}

pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> ApiResult<Folder> {
    let Path(workspace_id) = path?;
    let Json(body) = payload?;
    let folder = state
        .services
        .workspaces
        .create_folder(auth_user.user_id, workspace_id, &body.name)
        .await?;
    Ok(ApiResponse::created(folder))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<FolderDetail> {
    let Path((workspace_id, folder_id)) = path?;
    let folder = state
        .services
        .workspaces
        .get_folder(auth_user.user_id, workspace_id, folder_id)
        .await?;
    Ok(ApiResponse::success(folder))
}

/// DELETE moves the folder's forms to the workspace's top level
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path((workspace_id, folder_id)) = path?;
    state
        .services
        .workspaces
        .delete_folder(auth_user.user_id, workspace_id, folder_id)
        .await?;
    Ok(ApiResponse::success(Deleted {
        id: folder_id,
        deleted: true,
    }))
}
