use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenIssuer};
use crate::database::models::{Theme, User, Workspace};
use crate::database::{DatabaseError, Store};
use crate::services::error::{ServiceError, ServiceResult};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
}

/// Sign-up with workspace bootstrap, login and profile maintenance
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Create the user together with the empty workspace it owns
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> ServiceResult<User> {
        let username = username.trim();
        let email = normalize_email(email)?;
        if username.is_empty() {
            return Err(ServiceError::invalid_input("Username is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::invalid_input(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("An account with that email already exists"));
        }

        let password_hash =
            hash_password(password).map_err(|e| ServiceError::internal(format!("password hashing failed: {}", e)))?;

        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let workspace = Workspace::new(format!("{}'s workspace", username), user_id);
        let user = User {
            id: user_id,
            username: username.to_string(),
            email,
            password_hash,
            workspace_id: workspace.id,
            theme: Theme::default(),
            shared_workspaces: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_account(&user, &workspace)
            .await
            .map_err(duplicate_email)?;

        info!(user_id = %user.id, workspace_id = %workspace.id, "created account");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginSession> {
        let email = email.trim().to_lowercase();
        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("failed login attempt");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let token = self
            .tokens
            .issue(&user)
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginSession {
            token,
            expires_in: self.tokens.expiry_hours() * 3600,
            user,
        })
    }

    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    pub async fn update_theme(&self, user_id: Uuid, theme: Theme) -> ServiceResult<User> {
        if !self.store.update_user_theme(user_id, theme).await? {
            return Err(ServiceError::not_found("User not found"));
        }
        self.profile(user_id).await
    }

    /// Fields left out keep their current value
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
    ) -> ServiceResult<User> {
        let current = self.profile(user_id).await?;

        let username = match username.map(str::trim) {
            Some("") => return Err(ServiceError::invalid_input("Username cannot be empty")),
            Some(name) => name.to_string(),
            None => current.username,
        };
        let email = match email {
            Some(email) => normalize_email(email)?,
            None => current.email,
        };

        self.store
            .update_user_profile(user_id, &username, &email)
            .await
            .map_err(duplicate_email)?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}

fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !valid {
        return Err(ServiceError::invalid_input("A valid email address is required"));
    }
    Ok(email)
}

fn duplicate_email(err: DatabaseError) -> ServiceError {
    match err {
        DatabaseError::Duplicate(_) => ServiceError::conflict("An account with that email already exists"),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::ErrorKind;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn signup_bootstraps_an_owned_workspace() {
        let ctx = TestContext::new();
        let user = ctx
            .services
            .accounts
            .signup("Ada", "Ada@Example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        let workspace = ctx.store.find_workspace(user.workspace_id).await.unwrap().unwrap();
        assert_eq!(workspace.created_by, user.id);
        assert_eq!(workspace.name, "Ada's workspace");
        assert!(workspace.folders.is_empty() && workspace.forms.is_empty());
    }

    #[tokio::test]
    async fn signup_validates_and_rejects_duplicates() {
        let ctx = TestContext::new();
        let accounts = &ctx.services.accounts;

        for (name, email, password) in [
            ("", "a@example.com", "secret1"),
            ("a", "not-an-email", "secret1"),
            ("a", "a@example.com", "short"),
        ] {
            let err = accounts.signup(name, email, password).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }

        accounts.signup("a", "a@example.com", "secret1").await.unwrap();
        let err = accounts.signup("b", "A@example.com", "secret2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let ctx = TestContext::new();
        let accounts = &ctx.services.accounts;
        let user = accounts.signup("ada", "ada@example.com", "secret1").await.unwrap();

        let session = accounts.login("ADA@example.com", "secret1").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(ctx.tokens.verify(&session.token).unwrap().sub, user.id);

        let wrong = accounts.login("ada@example.com", "secret2").await.unwrap_err();
        let unknown = accounts.login("bob@example.com", "secret1").await.unwrap_err();
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn profile_updates() {
        let ctx = TestContext::new();
        let ada = ctx.signup("ada").await;
        let bob = ctx.signup("bob").await;
        let accounts = &ctx.services.accounts;

        let updated = accounts.update_theme(ada.id, Theme::Light).await.unwrap();
        assert_eq!(updated.theme, Theme::Light);

        let updated = accounts.update_profile(ada.id, Some("Ada L."), None).await.unwrap();
        assert_eq!(updated.username, "Ada L.");
        assert_eq!(updated.email, ada.email);

        let err = accounts.update_profile(ada.id, None, Some(&bob.email)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
