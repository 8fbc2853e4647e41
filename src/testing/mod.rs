use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::config::SessionConfig;
use crate::database::models::{AccessLevel, ElementDraft, ElementType, Form, Theme, User, Workspace, WorkspaceGrant};
use crate::database::{MemoryStore, Store};
use crate::services::Services;

/// Services over a fresh in-memory store
pub struct TestContext {
    pub store: Arc<dyn Store>,
    pub services: Services,
    pub tokens: TokenIssuer,
}

impl TestContext {
    pub fn new() -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let tokens = TokenIssuer::new("test-secret", 1);
        let sessions = SessionConfig { max_issue_attempts: 3 };
        let services = Services::new(store.clone(), tokens.clone(), &sessions);

        Self { store, services, tokens }
    }

    /// Insert a user and their workspace directly, skipping password hashing.
    /// The account cannot log in.
    pub async fn signup(&self, name: &str) -> User {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let workspace = Workspace::new(format!("{}'s workspace", name), user_id);
        let user = User {
            id: user_id,
            username: name.to_string(),
            email: format!("{}-{}@example.com", name, user_id.simple()),
            password_hash: String::new(),
            workspace_id: workspace.id,
            theme: Theme::default(),
            shared_workspaces: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_account(&user, &workspace)
            .await
            .expect("failed to create test account");
        user
    }

    pub async fn grant(&self, user: &User, workspace_id: Uuid, access_level: AccessLevel) {
        let grant = WorkspaceGrant { workspace_id, access_level };
        let added = self
            .store
            .add_grant(user.id, &grant)
            .await
            .expect("failed to add test grant");
        assert!(added, "user {} already holds a grant", user.username);
    }

    /// Top-level form in the owner's workspace
    pub async fn form(&self, owner: &User, name: &str) -> Form {
        self.services
            .workspaces
            .create_form(owner.id, owner.workspace_id, None, name)
            .await
            .expect("failed to create test form")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn draft(client_id: &str, element_type: ElementType, required: bool) -> ElementDraft {
    ElementDraft {
        id: client_id.to_string(),
        element_type,
        label: Some(client_id.to_uppercase()),
        placeholder: None,
        options: None,
        value: None,
        required: Some(required),
        link: None,
    }
}
