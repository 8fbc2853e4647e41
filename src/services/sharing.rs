use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{AccessLevel, WorkspaceGrant};
use crate::database::Store;
use crate::services::error::{ServiceError, ServiceResult};

/// Grants collaborators access to workspaces.
///
/// Owners share their own workspace by email. A share link instead lets whoever
/// holds it grant themselves the encoded level on someone else's workspace.
#[derive(Clone)]
pub struct SharingService {
    store: Arc<dyn Store>,
}

impl SharingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn share(&self, user_id: Uuid, invitee_email: &str, level: AccessLevel) -> ServiceResult<WorkspaceGrant> {
        let owner = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let email = invitee_email.trim().to_lowercase();
        let invitee = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("No user is registered with that email"))?;
        if invitee.id == owner.id {
            return Err(ServiceError::conflict("You cannot share a workspace with yourself"));
        }

        let grant = WorkspaceGrant {
            workspace_id: owner.workspace_id,
            access_level: level,
        };
        self.insert_grant(invitee.id, grant).await
    }

    pub async fn share_via_link(&self, user_id: Uuid, workspace_id: Uuid, level: AccessLevel) -> ServiceResult<WorkspaceGrant> {
        let workspace = self
            .store
            .find_workspace(workspace_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Workspace not found"))?;
        if workspace.created_by == user_id {
            return Err(ServiceError::conflict("You already own this workspace"));
        }

        let grant = WorkspaceGrant {
            workspace_id: workspace.id,
            access_level: level,
        };
        self.insert_grant(user_id, grant).await
    }

    async fn insert_grant(&self, user_id: Uuid, grant: WorkspaceGrant) -> ServiceResult<WorkspaceGrant> {
        if !self.store.add_grant(user_id, &grant).await? {
            warn!(%user_id, workspace_id = %grant.workspace_id, "duplicate workspace grant");
            return Err(ServiceError::conflict("This workspace is already shared with that user"));
        }

        info!(
            %user_id,
            workspace_id = %grant.workspace_id,
            access_level = %grant.access_level,
            "granted workspace access"
        );
        Ok(grant)
    }
}
