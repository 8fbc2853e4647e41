use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Element, EntryUpdate, Folder, Form, FormContainer, FormCounter, FormEntry,
    Response, SessionId, Theme, User, Workspace, WorkspaceGrant,
};

/// Document store behind every service.
///
/// Each method is atomic on its own. Methods that touch a child document and
/// its container's back-reference list apply both writes or neither, so callers
/// never see one side without the other.
#[async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a user together with the workspace it owns.
    /// Fails with `Duplicate` when the email is taken.
    async fn create_account(&self, user: &User, workspace: &Workspace) -> Result<(), DatabaseError>;

    /// Fails with `Duplicate` when the new email belongs to another user.
    async fn update_user_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, DatabaseError>;

    async fn update_user_theme(&self, id: Uuid, theme: Theme) -> Result<bool, DatabaseError>;

    /// Insert-if-absent. Returns false when the user already holds a grant for the workspace.
    async fn add_grant(&self, user_id: Uuid, grant: &WorkspaceGrant) -> Result<bool, DatabaseError>;

    // Workspaces

    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError>;

    // Folders

    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, DatabaseError>;

    async fn list_folders(&self, workspace_id: Uuid) -> Result<Vec<Folder>, DatabaseError>;

    /// Insert the folder and append its id to the workspace's folder list.
    async fn insert_folder(&self, folder: &Folder) -> Result<(), DatabaseError>;

    /// Move the folder's forms to the workspace's top level, detach the folder
    /// from its workspace and delete it. Returns false when the folder is gone.
    async fn delete_folder(&self, folder_id: Uuid) -> Result<bool, DatabaseError>;

    // Forms

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, DatabaseError>;

    /// Forms of a workspace; `None` selects top-level forms only.
    async fn list_forms(
        &self,
        workspace_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<Form>, DatabaseError>;

    /// Insert the form and append its id to its folder, or to its workspace when it has no folder.
    async fn insert_form(&self, form: &Form) -> Result<(), DatabaseError>;

    /// Remove the form id from the container, then delete the form with its
    /// elements and entries. Returns false when the container does not hold the id.
    async fn delete_form(&self, form_id: Uuid, container: FormContainer) -> Result<bool, DatabaseError>;

    async fn increment_form_counter(&self, form_id: Uuid, counter: FormCounter) -> Result<bool, DatabaseError>;

    /// Set the form's element list and delete the form's elements not in it.
    async fn replace_form_elements(&self, form_id: Uuid, element_ids: &[Uuid]) -> Result<bool, DatabaseError>;

    // Elements

    async fn find_element_by_client_id(
        &self,
        form_id: Uuid,
        client_id: &str,
    ) -> Result<Option<Element>, DatabaseError>;

    async fn insert_element(&self, element: &Element) -> Result<(), DatabaseError>;

    async fn update_element(&self, element: &Element) -> Result<(), DatabaseError>;

    /// Elements by id, in the order of `ids`; unknown ids are skipped.
    async fn find_elements(&self, ids: &[Uuid]) -> Result<Vec<Element>, DatabaseError>;

    // Form entries

    async fn session_in_use(&self, session_id: SessionId) -> Result<bool, DatabaseError>;

    async fn find_entry(
        &self,
        form_id: Uuid,
        session_id: SessionId,
    ) -> Result<Option<FormEntry>, DatabaseError>;

    /// Insert a new entry and bump the form's start counter in one step.
    /// Returns false, changing nothing, when the session already has an entry for the form.
    async fn start_entry(&self, entry: &FormEntry) -> Result<bool, DatabaseError>;

    /// Overwrite or append the response on an open entry.
    async fn record_response(
        &self,
        form_id: Uuid,
        session_id: SessionId,
        response: &Response,
    ) -> Result<EntryUpdate, DatabaseError>;

    /// Flip `is_completed` false to true and bump the form's completion counter in one step.
    async fn complete_entry(&self, form_id: Uuid, session_id: SessionId) -> Result<EntryUpdate, DatabaseError>;

    async fn list_entries(&self, form_id: Uuid) -> Result<Vec<FormEntry>, DatabaseError>;
}

