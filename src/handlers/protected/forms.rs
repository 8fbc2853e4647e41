// handlers/protected/forms.rs - Form management for workspace members

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Element, ElementDraft, Form};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{FormResponses, Listing};

use super::folders::Deleted;

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    /// Restrict to one folder; omitted means top-level forms only
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub name: String,
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SaveElementsRequest {
    pub elements: Vec<ElementDraft>,
}

/// GET /api/workspaces/:workspace_id/forms[?folder_id=]
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<FolderQuery>, QueryRejection>,
) -> ApiResult<Listing<Form>> {
    let Path(workspace_id) = path?;
    let Query(query) = query?;
    let forms = state
        .services
        .workspaces
        .list_forms(auth_user.user_id, workspace_id, query.folder_id)
        .await?;
    Ok(ApiResponse::success(forms))
}

/// POST /api/workspaces/:workspace_id/forms - `{"name": ..., "folder_id": null | uuid}`
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateFormRequest>, JsonRejection>,
) -> ApiResult<Form> {
    let Path(workspace_id) = path?;
    let Json(body) = payload?;
    let form = state
        .services
        .workspaces
        .create_form(auth_user.user_id, workspace_id, body.folder_id, &body.name)
        .await?;
    Ok(ApiResponse::created(form))
}

/// DELETE /api/workspaces/:workspace_id/forms/:form_id[?folder_id=]
///
/// The form must be in the named folder, or at top level without `folder_id`.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    query: Result<Query<FolderQuery>, QueryRejection>,
) -> ApiResult<Deleted> {
    let Path((workspace_id, form_id)) = path?;
    let Query(query) = query?;
    state
        .services
        .workspaces
        .delete_form(auth_user.user_id, workspace_id, form_id, query.folder_id)
        .await?;
    Ok(ApiResponse::success(Deleted {
        id: form_id,
        deleted: true,
    }))
}

/**
 * PUT /api/forms/:form_id/elements - Replace the form's element list
 *
 * Expected Input:
 * ```json
 * {
 *   "elements": [
 *     { "id": "q1", "type": "Text", "label": "Name", "required": true },
 *     { "id": "logo", "type": "Image", "link": "https://..." }
 *   ]
 * }
 * ```
 *
 * `id` is the editor's own stable id. Saving the same list twice changes nothing.
 */
pub async fn elements_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SaveElementsRequest>, JsonRejection>,
) -> ApiResult<Vec<Element>> {
    let Path(form_id) = path?;
    let Json(body) = payload?;
    let elements = state
        .services
        .workspaces
        .save_form_elements(auth_user.user_id, form_id, body.elements)
        .await?;
    Ok(ApiResponse::success(elements))
}

/// GET /api/forms/:form_id/responses - Counters plus one row per session
pub async fn responses_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<FormResponses> {
    let Path(form_id) = path?;
    let responses = state
        .services
        .responses
        .form_responses(auth_user.user_id, form_id)
        .await?;
    Ok(ApiResponse::success(responses))
}
