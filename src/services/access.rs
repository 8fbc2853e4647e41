use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{AccessLevel, Workspace};
use crate::database::Store;
use crate::services::error::{ServiceError, ServiceResult};

/// What a user may do inside one workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    Collaborator(AccessLevel),
    None,
}

impl Access {
    /// Owners always act at edit level
    pub fn level(&self) -> Option<AccessLevel> {
        match self {
            Access::Owner => Some(AccessLevel::Edit),
            Access::Collaborator(level) => Some(*level),
            Access::None => None,
        }
    }

    pub fn can_view(&self) -> bool {
        self.level().is_some()
    }

    pub fn can_edit(&self) -> bool {
        self.level() == Some(AccessLevel::Edit)
    }

    pub fn role(&self) -> &'static str {
        match self {
            Access::Owner => "owner",
            Access::Collaborator(_) => "collaborator",
            Access::None => "none",
        }
    }
}

/// On the wire only the effective level is sent: `"edit"`, `"view"` or `"none"`
impl Serialize for Access {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.level() {
            Some(level) => serializer.serialize_str(level.as_str()),
            None => serializer.serialize_str("none"),
        }
    }
}

/// Resolves a user's standing in a workspace.
///
/// Reads that fail report `NotFound` so a stranger cannot probe which
/// workspaces exist; writes that fail report `Unauthorized`.
#[derive(Clone)]
pub struct AccessResolver {
    store: Arc<dyn Store>,
}

impl AccessResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve_access(&self, user_id: Uuid, workspace_id: Uuid) -> ServiceResult<Access> {
        let Some(workspace) = self.store.find_workspace(workspace_id).await? else {
            return Ok(Access::None);
        };
        self.resolve_for(user_id, &workspace).await
    }

    async fn resolve_for(&self, user_id: Uuid, workspace: &Workspace) -> ServiceResult<Access> {
        if workspace.created_by == user_id {
            return Ok(Access::Owner);
        }

        let access = match self.store.find_user(user_id).await? {
            Some(user) => user
                .grant_for(workspace.id)
                .map(|grant| Access::Collaborator(grant.access_level))
                .unwrap_or(Access::None),
            None => Access::None,
        };
        Ok(access)
    }

    pub async fn require_view(&self, user_id: Uuid, workspace_id: Uuid) -> ServiceResult<(Workspace, Access)> {
        let workspace = self.store.find_workspace(workspace_id).await?;
        if let Some(workspace) = workspace {
            let access = self.resolve_for(user_id, &workspace).await?;
            if access.can_view() {
                return Ok((workspace, access));
            }
        }

        tracing::warn!(%user_id, %workspace_id, "view access denied");
        Err(ServiceError::not_found("Workspace not found"))
    }

    pub async fn require_edit(&self, user_id: Uuid, workspace_id: Uuid) -> ServiceResult<(Workspace, Access)> {
        let workspace = self.store.find_workspace(workspace_id).await?;
        if let Some(workspace) = workspace {
            let access = self.resolve_for(user_id, &workspace).await?;
            if access.can_edit() {
                return Ok((workspace, access));
            }
        }

        tracing::warn!(%user_id, %workspace_id, "edit access denied");
        Err(ServiceError::unauthorized("Edit access to this workspace is required"))
    }

    pub async fn require_owner(&self, user_id: Uuid, workspace_id: Uuid) -> ServiceResult<Workspace> {
        let workspace = self.store.find_workspace(workspace_id).await?;
        if let Some(workspace) = workspace {
            if workspace.created_by == user_id {
                return Ok(workspace);
            }
        }

        tracing::warn!(%user_id, %workspace_id, "owner access denied");
        Err(ServiceError::unauthorized("Only the workspace owner can do this"))
    }
}
