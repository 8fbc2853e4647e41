use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Element, EntryUpdate, Folder, Form, FormContainer, FormCounter, FormEntry, Response,
    SessionId, Theme, User, Workspace, WorkspaceGrant,
};
use crate::database::store::Store;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, workspace_id, theme, created_at, updated_at";
const WORKSPACE_COLUMNS: &str = "id, name, created_by, folders, forms, created_at, updated_at";
const FOLDER_COLUMNS: &str = "id, name, workspace_id, created_by, forms, created_at, updated_at";
const FORM_COLUMNS: &str = "id, name, workspace_id, folder_id, created_by, elements, \
     view_count, start_count, completed_count, created_at, updated_at";
const ELEMENT_COLUMNS: &str = "id, client_id, form_id, element_type, label, placeholder, \
     options, value, required, link, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, form_id, session_id, responses, is_completed, completed_at, created_at, updated_at";

/// Postgres-backed store. Multi-row operations run in a single transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_grants(&self, user_id: Uuid) -> Result<Vec<WorkspaceGrant>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT workspace_id, access_level FROM workspace_grants \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<WorkspaceGrant, DatabaseError> {
                let level: String = row.try_get("access_level")?;
                Ok(WorkspaceGrant {
                    workspace_id: row.try_get("workspace_id")?,
                    access_level: level.parse().map_err(DatabaseError::QueryError)?,
                })
            })
            .collect()
    }

    async fn with_grants(&self, row: Option<PgRow>) -> Result<Option<User>, DatabaseError> {
        match row {
            Some(row) => {
                let mut user = user_from_row(&row)?;
                user.shared_workspaces = self.load_grants(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DatabaseError> {
    let theme: String = row.try_get("theme")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        workspace_id: row.try_get("workspace_id")?,
        theme: theme.parse::<Theme>().map_err(DatabaseError::QueryError)?,
        shared_workspaces: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn workspace_from_row(row: &PgRow) -> Result<Workspace, DatabaseError> {
    Ok(Workspace {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_by: row.try_get("created_by")?,
        folders: row.try_get("folders")?,
        forms: row.try_get("forms")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn folder_from_row(row: &PgRow) -> Result<Folder, DatabaseError> {
    Ok(Folder {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        workspace_id: row.try_get("workspace_id")?,
        created_by: row.try_get("created_by")?,
        forms: row.try_get("forms")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn form_from_row(row: &PgRow) -> Result<Form, DatabaseError> {
    Ok(Form {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        workspace_id: row.try_get("workspace_id")?,
        folder_id: row.try_get("folder_id")?,
        created_by: row.try_get("created_by")?,
        elements: row.try_get("elements")?,
        view_count: row.try_get("view_count")?,
        start_count: row.try_get("start_count")?,
        completed_count: row.try_get("completed_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn element_from_row(row: &PgRow) -> Result<Element, DatabaseError> {
    let element_type: String = row.try_get("element_type")?;
    Ok(Element {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        form_id: row.try_get("form_id")?,
        element_type: element_type.parse().map_err(DatabaseError::QueryError)?,
        label: row.try_get("label")?,
        placeholder: row.try_get("placeholder")?,
        options: row.try_get("options")?,
        value: row.try_get("value")?,
        required: row.try_get("required")?,
        link: row.try_get("link")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn entry_from_row(row: &PgRow) -> Result<FormEntry, DatabaseError> {
    let session_id: Uuid = row.try_get("session_id")?;
    let Json(responses): Json<Vec<Response>> = row.try_get("responses")?;
    Ok(FormEntry {
        id: row.try_get("id")?,
        form_id: row.try_get("form_id")?,
        session_id: SessionId::from(session_id),
        responses,
        is_completed: row.try_get("is_completed")?,
        completed_at: row.try_get("completed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_grants(row).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        self.with_grants(row).await
    }

    async fn create_account(&self, user: &User, workspace: &Workspace) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.workspace_id)
        .bind(user.theme.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_unique(e, format!("email {}", user.email)))?;

        sqlx::query(&format!(
            "INSERT INTO workspaces ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            WORKSPACE_COLUMNS
        ))
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(workspace.created_by)
        .bind(workspace.folders.clone())
        .bind(workspace.forms.clone())
        .bind(workspace.created_at)
        .bind(workspace.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET username = $2, email = $3, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, format!("email {}", email)))?;
        self.with_grants(row).await
    }

    async fn update_user_theme(&self, id: Uuid, theme: Theme) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET theme = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(theme.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn add_grant(&self, user_id: Uuid, grant: &WorkspaceGrant) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO workspace_grants (user_id, workspace_id, access_level) \
             VALUES ($1, $2, $3) ON CONFLICT (user_id, workspace_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(grant.workspace_id)
        .bind(grant.access_level.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        sqlx::query(&format!("SELECT {} FROM workspaces WHERE id = $1", WORKSPACE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(workspace_from_row)
            .transpose()
    }

    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, DatabaseError> {
        sqlx::query(&format!("SELECT {} FROM folders WHERE id = $1", FOLDER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(folder_from_row)
            .transpose()
    }

    async fn list_folders(&self, workspace_id: Uuid) -> Result<Vec<Folder>, DatabaseError> {
        sqlx::query(&format!(
            "SELECT {} FROM folders WHERE workspace_id = $1 ORDER BY created_at",
            FOLDER_COLUMNS
        ))
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(folder_from_row)
        .collect()
    }

    async fn insert_folder(&self, folder: &Folder) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let attached = sqlx::query(
            "UPDATE workspaces SET folders = array_append(folders, $2), updated_at = now() \
             WHERE id = $1",
        )
        .bind(folder.workspace_id)
        .bind(folder.id)
        .execute(&mut *tx)
        .await?;
        if attached.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("workspace {}", folder.workspace_id)));
        }

        sqlx::query(&format!(
            "INSERT INTO folders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            FOLDER_COLUMNS
        ))
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.workspace_id)
        .bind(folder.created_by)
        .bind(folder.forms.clone())
        .bind(folder.created_at)
        .bind(folder.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_folder(&self, folder_id: Uuid) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query("DELETE FROM folders WHERE id = $1 RETURNING workspace_id, forms")
            .bind(folder_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(false);
        };
        let workspace_id: Uuid = row.try_get("workspace_id")?;
        let orphans: Vec<Uuid> = row.try_get("forms")?;

        sqlx::query("UPDATE forms SET folder_id = NULL, updated_at = now() WHERE folder_id = $1")
            .bind(folder_id)
            .execute(&mut *tx)
            .await?;

        let top_level: Option<Vec<Uuid>> =
            sqlx::query_scalar("SELECT forms FROM workspaces WHERE id = $1 FOR UPDATE")
                .bind(workspace_id)
                .fetch_optional(&mut *tx)
                .await?;
        if let Some(mut forms) = top_level {
            for id in orphans {
                if !forms.contains(&id) {
                    forms.push(id);
                }
            }
            sqlx::query(
                "UPDATE workspaces SET folders = array_remove(folders, $2), forms = $3, \
                 updated_at = now() WHERE id = $1",
            )
            .bind(workspace_id)
            .bind(folder_id)
            .bind(forms)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, DatabaseError> {
        sqlx::query(&format!("SELECT {} FROM forms WHERE id = $1", FORM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(form_from_row)
            .transpose()
    }

    async fn list_forms(
        &self,
        workspace_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<Form>, DatabaseError> {
        sqlx::query(&format!(
            "SELECT {} FROM forms WHERE workspace_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
             ORDER BY created_at",
            FORM_COLUMNS
        ))
        .bind(workspace_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(form_from_row)
        .collect()
    }

    async fn insert_form(&self, form: &Form) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let attached = match form.folder_id {
            Some(folder_id) => sqlx::query(
                "UPDATE folders SET forms = array_append(forms, $2), updated_at = now() \
                 WHERE id = $1",
            )
            .bind(folder_id)
            .bind(form.id)
            .execute(&mut *tx)
            .await?,
            None => sqlx::query(
                "UPDATE workspaces SET forms = array_append(forms, $2), updated_at = now() \
                 WHERE id = $1",
            )
            .bind(form.workspace_id)
            .bind(form.id)
            .execute(&mut *tx)
            .await?,
        };
        if attached.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("form container".to_string()));
        }

        sqlx::query(&format!(
            "INSERT INTO forms ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            FORM_COLUMNS
        ))
        .bind(form.id)
        .bind(&form.name)
        .bind(form.workspace_id)
        .bind(form.folder_id)
        .bind(form.created_by)
        .bind(form.elements.clone())
        .bind(form.view_count)
        .bind(form.start_count)
        .bind(form.completed_count)
        .bind(form.created_at)
        .bind(form.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_form(&self, form_id: Uuid, container: FormContainer) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let detach = match container {
            FormContainer::Folder(id) => sqlx::query(
                "UPDATE folders SET forms = array_remove(forms, $2), updated_at = now() \
                 WHERE id = $1 AND $2 = ANY(forms)",
            )
            .bind(id),
            FormContainer::Workspace(id) => sqlx::query(
                "UPDATE workspaces SET forms = array_remove(forms, $2), updated_at = now() \
                 WHERE id = $1 AND $2 = ANY(forms)",
            )
            .bind(id),
        };
        let detached = detach.bind(form_id).execute(&mut *tx).await?;
        if detached.rows_affected() == 0 {
            return Ok(false);
        }

        // elements and entries go with the form (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(form_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn increment_form_counter(&self, form_id: Uuid, counter: FormCounter) -> Result<bool, DatabaseError> {
        let column = counter.column();
        let result = sqlx::query(&format!(
            "UPDATE forms SET {column} = {column} + 1, updated_at = now() WHERE id = $1"
        ))
        .bind(form_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn replace_form_elements(&self, form_id: Uuid, element_ids: &[Uuid]) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE forms SET elements = $2, updated_at = now() WHERE id = $1")
            .bind(form_id)
            .bind(element_ids.to_vec())
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM elements WHERE form_id = $1 AND NOT (id = ANY($2))")
            .bind(form_id)
            .bind(element_ids.to_vec())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn find_element_by_client_id(
        &self,
        form_id: Uuid,
        client_id: &str,
    ) -> Result<Option<Element>, DatabaseError> {
        sqlx::query(&format!(
            "SELECT {} FROM elements WHERE form_id = $1 AND client_id = $2",
            ELEMENT_COLUMNS
        ))
        .bind(form_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(element_from_row)
        .transpose()
    }

    async fn insert_element(&self, element: &Element) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "INSERT INTO elements ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            ELEMENT_COLUMNS
        ))
        .bind(element.id)
        .bind(&element.client_id)
        .bind(element.form_id)
        .bind(element.element_type.as_str())
        .bind(&element.label)
        .bind(&element.placeholder)
        .bind(element.options.clone())
        .bind(&element.value)
        .bind(element.required)
        .bind(&element.link)
        .bind(element.created_at)
        .bind(element.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique(e, format!("element {}", element.client_id)))?;
        Ok(())
    }

    async fn update_element(&self, element: &Element) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE elements SET element_type = $2, label = $3, placeholder = $4, options = $5, \
             value = $6, required = $7, link = $8, updated_at = $9 WHERE id = $1",
        )
        .bind(element.id)
        .bind(element.element_type.as_str())
        .bind(&element.label)
        .bind(&element.placeholder)
        .bind(element.options.clone())
        .bind(&element.value)
        .bind(element.required)
        .bind(&element.link)
        .bind(element.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("element {}", element.id)));
        }
        Ok(())
    }

    async fn find_elements(&self, ids: &[Uuid]) -> Result<Vec<Element>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query(&format!(
            "SELECT {} FROM elements WHERE id = ANY($1)",
            ELEMENT_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut found = rows
            .iter()
            .map(element_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let mut ordered = Vec::with_capacity(found.len());
        for id in ids {
            if let Some(position) = found.iter().position(|e| e.id == *id) {
                ordered.push(found.swap_remove(position));
            }
        }
        Ok(ordered)
    }

    async fn session_in_use(&self, session_id: SessionId) -> Result<bool, DatabaseError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM form_entries WHERE session_id = $1)")
                .bind(session_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_entry(
        &self,
        form_id: Uuid,
        session_id: SessionId,
    ) -> Result<Option<FormEntry>, DatabaseError> {
        sqlx::query(&format!(
            "SELECT {} FROM form_entries WHERE form_id = $1 AND session_id = $2",
            ENTRY_COLUMNS
        ))
        .bind(form_id)
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(entry_from_row)
        .transpose()
    }

    async fn start_entry(&self, entry: &FormEntry) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(&format!(
            "INSERT INTO form_entries ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (form_id, session_id) DO NOTHING",
            ENTRY_COLUMNS
        ))
        .bind(entry.id)
        .bind(entry.form_id)
        .bind(entry.session_id.as_uuid())
        .bind(Json(&entry.responses))
        .bind(entry.is_completed)
        .bind(entry.completed_at)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        let bumped = sqlx::query(
            "UPDATE forms SET start_count = start_count + 1, updated_at = now() WHERE id = $1",
        )
        .bind(entry.form_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("form {}", entry.form_id)));
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn record_response(
        &self,
        form_id: Uuid,
        session_id: SessionId,
        response: &Response,
    ) -> Result<EntryUpdate, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM form_entries WHERE form_id = $1 AND session_id = $2 FOR UPDATE",
            ENTRY_COLUMNS
        ))
        .bind(form_id)
        .bind(session_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(EntryUpdate::Missing);
        };
        let mut entry = entry_from_row(&row)?;
        if entry.is_completed {
            return Ok(EntryUpdate::AlreadyCompleted);
        }

        entry.upsert_response(response.clone());
        sqlx::query("UPDATE form_entries SET responses = $2, updated_at = $3 WHERE id = $1")
            .bind(entry.id)
            .bind(Json(&entry.responses))
            .bind(entry.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(EntryUpdate::Applied)
    }

    async fn complete_entry(&self, form_id: Uuid, session_id: SessionId) -> Result<EntryUpdate, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            "UPDATE form_entries SET is_completed = true, completed_at = now(), updated_at = now() \
             WHERE form_id = $1 AND session_id = $2 AND NOT is_completed",
        )
        .bind(form_id)
        .bind(session_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM form_entries WHERE form_id = $1 AND session_id = $2)",
            )
            .bind(form_id)
            .bind(session_id.as_uuid())
            .fetch_one(&mut *tx)
            .await?;
            return Ok(if exists {
                EntryUpdate::AlreadyCompleted
            } else {
                EntryUpdate::Missing
            });
        }

        sqlx::query(
            "UPDATE forms SET completed_count = completed_count + 1, updated_at = now() WHERE id = $1",
        )
        .bind(form_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(EntryUpdate::Applied)
    }

    async fn list_entries(&self, form_id: Uuid) -> Result<Vec<FormEntry>, DatabaseError> {
        sqlx::query(&format!(
            "SELECT {} FROM form_entries WHERE form_id = $1 ORDER BY created_at",
            ENTRY_COLUMNS
        ))
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(entry_from_row)
        .collect()
    }
}
