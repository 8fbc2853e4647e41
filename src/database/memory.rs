use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Element, EntryUpdate, Folder, Form, FormContainer, FormCounter, FormEntry, Response,
    SessionId, Theme, User, Workspace, WorkspaceGrant,
};
use crate::database::store::Store;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    workspaces: HashMap<Uuid, Workspace>,
    folders: HashMap<Uuid, Folder>,
    forms: HashMap<Uuid, Form>,
    elements: HashMap<Uuid, Element>,
    entries: HashMap<(Uuid, SessionId), FormEntry>,
}

impl Tables {
    fn bump(&mut self, form_id: Uuid, counter: FormCounter) -> bool {
        match self.forms.get_mut(&form_id) {
            Some(form) => {
                match counter {
                    FormCounter::Views => form.view_count += 1,
                    FormCounter::Starts => form.start_count += 1,
                    FormCounter::Completions => form.completed_count += 1,
                }
                form.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

/// In-process store used for development and tests.
///
/// Every operation holds the single write (or read) lock for its whole
/// duration, which gives each one the all-or-nothing behaviour of a transaction.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_account(&self, user: &User, workspace: &Workspace) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate(format!("email {}", user.email)));
        }
        tables.users.insert(user.id, user.clone());
        tables.workspaces.insert(workspace.id, workspace.clone());
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(DatabaseError::Duplicate(format!("email {}", email)));
        }
        Ok(tables.users.get_mut(&id).map(|user| {
            user.username = username.to_string();
            user.email = email.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_user_theme(&self, id: Uuid, theme: Theme) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(&id) {
            Some(user) => {
                user.theme = theme;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn add_grant(&self, user_id: Uuid, grant: &WorkspaceGrant) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))?;
        if user.grant_for(grant.workspace_id).is_some() {
            return Ok(false);
        }
        user.shared_workspaces.push(grant.clone());
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        Ok(self.tables.read().await.workspaces.get(&id).cloned())
    }

    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, DatabaseError> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn list_folders(&self, workspace_id: Uuid) -> Result<Vec<Folder>, DatabaseError> {
        let tables = self.tables.read().await;
        let folders = tables
            .folders
            .values()
            .filter(|f| f.workspace_id == workspace_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(folders, |f: &Folder| f.created_at))
    }

    async fn insert_folder(&self, folder: &Folder) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let workspace = tables
            .workspaces
            .get_mut(&folder.workspace_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("workspace {}", folder.workspace_id)))?;
        workspace.folders.push(folder.id);
        workspace.updated_at = Utc::now();
        tables.folders.insert(folder.id, folder.clone());
        Ok(())
    }

    async fn delete_folder(&self, folder_id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(folder) = tables.folders.remove(&folder_id) else {
            return Ok(false);
        };

        let now = Utc::now();
        for form_id in &folder.forms {
            if let Some(form) = tables.forms.get_mut(form_id) {
                form.folder_id = None;
                form.updated_at = now;
            }
        }
        if let Some(workspace) = tables.workspaces.get_mut(&folder.workspace_id) {
            workspace.folders.retain(|id| *id != folder_id);
            for form_id in folder.forms {
                if !workspace.forms.contains(&form_id) {
                    workspace.forms.push(form_id);
                }
            }
            workspace.updated_at = now;
        }
        Ok(true)
    }

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, DatabaseError> {
        Ok(self.tables.read().await.forms.get(&id).cloned())
    }

    async fn list_forms(
        &self,
        workspace_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<Form>, DatabaseError> {
        let tables = self.tables.read().await;
        let forms = tables
            .forms
            .values()
            .filter(|f| f.workspace_id == workspace_id && f.folder_id == folder_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(forms, |f: &Form| f.created_at))
    }

    async fn insert_form(&self, form: &Form) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        match form.folder_id {
            Some(folder_id) => {
                let folder = tables
                    .folders
                    .get_mut(&folder_id)
                    .ok_or_else(|| DatabaseError::NotFound(format!("folder {}", folder_id)))?;
                folder.forms.push(form.id);
                folder.updated_at = now;
            }
            None => {
                let workspace = tables
                    .workspaces
                    .get_mut(&form.workspace_id)
                    .ok_or_else(|| DatabaseError::NotFound(format!("workspace {}", form.workspace_id)))?;
                workspace.forms.push(form.id);
                workspace.updated_at = now;
            }
        }
        tables.forms.insert(form.id, form.clone());
        Ok(())
    }

    async fn delete_form(&self, form_id: Uuid, container: FormContainer) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.forms.contains_key(&form_id) {
            return Ok(false);
        }

        let list = match container {
            FormContainer::Folder(id) => tables.folders.get_mut(&id).map(|f| &mut f.forms),
            FormContainer::Workspace(id) => tables.workspaces.get_mut(&id).map(|w| &mut w.forms),
        };
        let Some(list) = list else {
            return Ok(false);
        };
        let Some(position) = list.iter().position(|id| *id == form_id) else {
            return Ok(false);
        };
        list.remove(position);

        tables.forms.remove(&form_id);
        tables.elements.retain(|_, e| e.form_id != form_id);
        tables.entries.retain(|(f, _), _| *f != form_id);
        Ok(true)
    }

    async fn increment_form_counter(&self, form_id: Uuid, counter: FormCounter) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.bump(form_id, counter))
    }

    async fn replace_form_elements(&self, form_id: Uuid, element_ids: &[Uuid]) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(form) = tables.forms.get_mut(&form_id) else {
            return Ok(false);
        };
        form.elements = element_ids.to_vec();
        form.updated_at = Utc::now();
        tables
            .elements
            .retain(|id, e| e.form_id != form_id || element_ids.contains(id));
        Ok(true)
    }

    async fn find_element_by_client_id(
        &self,
        form_id: Uuid,
        client_id: &str,
    ) -> Result<Option<Element>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .elements
            .values()
            .find(|e| e.form_id == form_id && e.client_id == client_id)
            .cloned())
    }

    async fn insert_element(&self, element: &Element) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .elements
            .values()
            .any(|e| e.form_id == element.form_id && e.client_id == element.client_id);
        if taken {
            return Err(DatabaseError::Duplicate(format!("element {}", element.client_id)));
        }
        tables.elements.insert(element.id, element.clone());
        Ok(())
    }

    async fn update_element(&self, element: &Element) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.elements.get_mut(&element.id) {
            Some(existing) => {
                *existing = element.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("element {}", element.id))),
        }
    }

    async fn find_elements(&self, ids: &[Uuid]) -> Result<Vec<Element>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.elements.get(id).cloned())
            .collect())
    }

    async fn session_in_use(&self, session_id: SessionId) -> Result<bool, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.entries.keys().any(|(_, s)| *s == session_id))
    }

    async fn find_entry(
        &self,
        form_id: Uuid,
        session_id: SessionId,
    ) -> Result<Option<FormEntry>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .entries
            .get(&(form_id, session_id))
            .cloned())
    }

    async fn start_entry(&self, entry: &FormEntry) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let key = (entry.form_id, entry.session_id);
        if tables.entries.contains_key(&key) {
            return Ok(false);
        }
        if !tables.bump(entry.form_id, FormCounter::Starts) {
            return Err(DatabaseError::NotFound(format!("form {}", entry.form_id)));
        }
        tables.entries.insert(key, entry.clone());
        Ok(true)
    }

    async fn record_response(
        &self,
        form_id: Uuid,
        session_id: SessionId,
        response: &Response,
    ) -> Result<EntryUpdate, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.entries.get_mut(&(form_id, session_id)) {
            None => EntryUpdate::Missing,
            Some(entry) if entry.is_completed => EntryUpdate::AlreadyCompleted,
            Some(entry) => {
                entry.upsert_response(response.clone());
                EntryUpdate::Applied
            }
        })
    }

    async fn complete_entry(&self, form_id: Uuid, session_id: SessionId) -> Result<EntryUpdate, DatabaseError> {
        let mut tables = self.tables.write().await;
        let outcome = match tables.entries.get_mut(&(form_id, session_id)) {
            None => EntryUpdate::Missing,
            Some(entry) if entry.is_completed => EntryUpdate::AlreadyCompleted,
            Some(entry) => {
                entry.mark_completed();
                EntryUpdate::Applied
            }
        };
        if outcome == EntryUpdate::Applied {
            tables.bump(form_id, FormCounter::Completions);
        }
        Ok(outcome)
    }

    async fn list_entries(&self, form_id: Uuid) -> Result<Vec<FormEntry>, DatabaseError> {
        let tables = self.tables.read().await;
        let entries = tables
            .entries
            .values()
            .filter(|e| e.form_id == form_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(entries, |e: &FormEntry| e.created_at))
    }
}
