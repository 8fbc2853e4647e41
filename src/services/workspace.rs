use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{Element, ElementDraft, Folder, Form, FormContainer};
use crate::database::Store;
use crate::services::access::{Access, AccessResolver};
use crate::services::error::{ServiceError, ServiceResult};

/// Items visible to a caller together with the access they hold
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub access_level: Access,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceSummary {
    pub id: Uuid,
    pub name: String,
    /// `"owner"` or `"collaborator"`
    pub role: &'static str,
    pub access_level: Access,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceOverview {
    pub id: Uuid,
    pub name: String,
    pub access_level: Access,
    pub folders: Vec<Summary>,
    pub forms: Vec<Summary>,
}

#[derive(Debug, Serialize)]
pub struct FolderDetail {
    #[serde(flatten)]
    pub folder: Folder,
    pub form_list: Vec<Form>,
    pub access_level: Access,
}

/// What a respondent needs to render a form
#[derive(Debug, Serialize)]
pub struct PublicForm {
    pub id: Uuid,
    pub name: String,
    pub elements: Vec<Element>,
}

/// Workspace, folder, form and element hierarchy.
///
/// Every write goes through a store method that updates the child document and
/// its container's id list together.
#[derive(Clone)]
pub struct WorkspaceService {
    store: Arc<dyn Store>,
    access: AccessResolver,
}

impl WorkspaceService {
    pub fn new(store: Arc<dyn Store>, access: AccessResolver) -> Self {
        Self { store, access }
    }

    /// The caller's own workspace first, then those shared with them
    pub async fn list_workspaces(&self, user_id: Uuid) -> ServiceResult<Vec<WorkspaceSummary>> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let mut summaries = Vec::with_capacity(1 + user.shared_workspaces.len());
        if let Some(own) = self.store.find_workspace(user.workspace_id).await? {
            summaries.push(WorkspaceSummary {
                id: own.id,
                name: own.name,
                role: Access::Owner.role(),
                access_level: Access::Owner,
            });
        }
        for grant in &user.shared_workspaces {
            // Grants may outlive the workspace they point at
            if let Some(shared) = self.store.find_workspace(grant.workspace_id).await? {
                let access = Access::Collaborator(grant.access_level);
                summaries.push(WorkspaceSummary {
                    id: shared.id,
                    name: shared.name,
                    role: access.role(),
                    access_level: access,
                });
            }
        }
        Ok(summaries)
    }

    pub async fn get_workspace(&self, user_id: Uuid, workspace_id: Uuid) -> ServiceResult<WorkspaceOverview> {
        let (workspace, access) = self.access.require_view(user_id, workspace_id).await?;

        let folders = self
            .store
            .list_folders(workspace.id)
            .await?
            .into_iter()
            .map(|f| Summary { id: f.id, name: f.name })
            .collect();
        let forms = self
            .store
            .list_forms(workspace.id, None)
            .await?
            .into_iter()
            .map(|f| Summary { id: f.id, name: f.name })
            .collect();

        Ok(WorkspaceOverview {
            id: workspace.id,
            name: workspace.name,
            access_level: access,
            folders,
            forms,
        })
    }

    // Folders

    pub async fn list_folders(&self, user_id: Uuid, workspace_id: Uuid) -> ServiceResult<Listing<Folder>> {
        let (workspace, access) = self.access.require_view(user_id, workspace_id).await?;
        let items = self.store.list_folders(workspace.id).await?;
        Ok(Listing { items, access_level: access })
    }

    pub async fn get_folder(&self, user_id: Uuid, workspace_id: Uuid, folder_id: Uuid) -> ServiceResult<FolderDetail> {
        let (_, access) = self.access.require_view(user_id, workspace_id).await?;
        let folder = self.folder_in(workspace_id, folder_id).await?;
        let form_list = self.store.list_forms(workspace_id, Some(folder.id)).await?;
        Ok(FolderDetail { folder, form_list, access_level: access })
    }

    pub async fn create_folder(&self, user_id: Uuid, workspace_id: Uuid, name: &str) -> ServiceResult<Folder> {
        let name = required_name(name, "Folder name")?;
        let (workspace, _) = self.access.require_edit(user_id, workspace_id).await?;

        let folder = Folder::new(name, workspace.id, user_id);
        self.store.insert_folder(&folder).await?;

        info!(folder_id = %folder.id, %workspace_id, "created folder");
        Ok(folder)
    }

    /// Forms inside the folder move to the workspace's top level
    pub async fn delete_folder(&self, user_id: Uuid, workspace_id: Uuid, folder_id: Uuid) -> ServiceResult<()> {
        self.access.require_edit(user_id, workspace_id).await?;
        let folder = self.folder_in(workspace_id, folder_id).await?;

        if !self.store.delete_folder(folder.id).await? {
            return Err(ServiceError::not_found("Folder not found"));
        }

        info!(%folder_id, %workspace_id, moved_forms = folder.forms.len(), "deleted folder");
        Ok(())
    }

    // Forms

    pub async fn list_forms(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> ServiceResult<Listing<Form>> {
        let (workspace, access) = self.access.require_view(user_id, workspace_id).await?;
        if let Some(folder_id) = folder_id {
            self.folder_in(workspace.id, folder_id).await?;
        }

        let items = self.store.list_forms(workspace.id, folder_id).await?;
        Ok(Listing { items, access_level: access })
    }

    pub async fn create_form(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> ServiceResult<Form> {
        let name = required_name(name, "Form name")?;
        let (workspace, _) = self.access.require_edit(user_id, workspace_id).await?;

        if let Some(folder_id) = folder_id {
            let folder = self
                .store
                .find_folder(folder_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Folder not found"))?;
            if folder.workspace_id != workspace.id {
                return Err(ServiceError::conflict("Folder belongs to a different workspace"));
            }
        }

        let form = Form::new(name, workspace.id, folder_id, user_id);
        self.store.insert_form(&form).await?;

        info!(form_id = %form.id, %workspace_id, ?folder_id, "created form");
        Ok(form)
    }

    /// The form id must sit in the named folder, or at top level when no folder is given
    pub async fn delete_form(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        form_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        self.access.require_edit(user_id, workspace_id).await?;

        let form = self.store.find_form(form_id).await?;
        if form.map(|f| f.workspace_id) != Some(workspace_id) {
            return Err(ServiceError::not_found("Form not found"));
        }

        let container = match folder_id {
            Some(folder_id) => {
                self.folder_in(workspace_id, folder_id).await?;
                FormContainer::Folder(folder_id)
            }
            None => FormContainer::Workspace(workspace_id),
        };

        if !self.store.delete_form(form_id, container).await? {
            return Err(ServiceError::not_found("Form not found in the given container"));
        }

        info!(%form_id, %workspace_id, ?folder_id, "deleted form");
        Ok(())
    }

    // Elements

    /// Reconcile the form's elements with the editor's list.
    ///
    /// Elements are matched on their client id; matches are updated only where a
    /// field differs, new ids are inserted, and elements no longer listed are
    /// removed. The form ends up listing exactly the given elements in order.
    pub async fn save_form_elements(
        &self,
        user_id: Uuid,
        form_id: Uuid,
        drafts: Vec<ElementDraft>,
    ) -> ServiceResult<Vec<Element>> {
        let form = self
            .store
            .find_form(form_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Form not found"))?;
        self.access.require_edit(user_id, form.workspace_id).await?;

        let mut seen = HashSet::new();
        for draft in &drafts {
            if draft.id.trim().is_empty() {
                return Err(ServiceError::invalid_input("Every element needs an id"));
            }
            if !seen.insert(draft.id.as_str()) {
                return Err(ServiceError::invalid_input(format!(
                    "Element id '{}' is listed more than once",
                    draft.id
                )));
            }
        }

        let mut element_ids = Vec::with_capacity(drafts.len());
        let (mut inserted, mut updated) = (0usize, 0usize);
        for draft in drafts {
            match self.store.find_element_by_client_id(form.id, &draft.id).await? {
                Some(mut existing) => {
                    if draft.apply_to(&mut existing) {
                        self.store.update_element(&existing).await?;
                        updated += 1;
                    }
                    element_ids.push(existing.id);
                }
                None => {
                    let element = draft.into_element(form.id);
                    self.store.insert_element(&element).await?;
                    element_ids.push(element.id);
                    inserted += 1;
                }
            }
        }

        if !self.store.replace_form_elements(form.id, &element_ids).await? {
            return Err(ServiceError::not_found("Form not found"));
        }

        debug!(%form_id, inserted, updated, total = element_ids.len(), "saved form elements");
        Ok(self.store.find_elements(&element_ids).await?)
    }

    /// Public view of a form for respondents
    pub async fn get_form_elements(&self, form_id: Uuid) -> ServiceResult<PublicForm> {
        let form = self
            .store
            .find_form(form_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Form not found"))?;
        let elements = self.store.find_elements(&form.elements).await?;

        Ok(PublicForm {
            id: form.id,
            name: form.name,
            elements,
        })
    }

    async fn folder_in(&self, workspace_id: Uuid, folder_id: Uuid) -> ServiceResult<Folder> {
        match self.store.find_folder(folder_id).await? {
            Some(folder) if folder.workspace_id == workspace_id => Ok(folder),
            _ => Err(ServiceError::not_found("Folder not found")),
        }
    }
}

fn required_name<'a>(name: &'a str, what: &str) -> ServiceResult<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::invalid_input(format!("{} is required", what)));
    }
    Ok(name)
}
