// Runs the services against PgStore. Skipped unless DATABASE_URL points at a
// disposable Postgres database; every test creates its own accounts so runs
// can share one database.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use formspace_api::auth::TokenIssuer;
use formspace_api::config::{DatabaseConfig, SessionConfig, StoreBackend};
use formspace_api::database::models::{ElementDraft, User};
use formspace_api::database::{DatabaseManager, PgStore, Store};
use formspace_api::services::{ErrorKind, ServiceError, Services};

static MIGRATED: Mutex<bool> = Mutex::const_new(false);

struct PgContext {
    store: Arc<dyn Store>,
    services: Services,
}

impl PgContext {
    async fn connect() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres store test");
            return Ok(None);
        };

        let config = DatabaseConfig {
            url: Some(url),
            backend: StoreBackend::Postgres,
            max_connections: 5,
            connection_timeout: 10,
        };
        let pool = DatabaseManager::connect(&config).await?;

        // Concurrent CREATE ... IF NOT EXISTS can still collide in Postgres
        let mut migrated = MIGRATED.lock().await;
        if !*migrated {
            DatabaseManager::migrate(&pool).await?;
            *migrated = true;
        }
        drop(migrated);

        let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
        let tokens = TokenIssuer::new("pg-test-secret", 1);
        let services = Services::new(store.clone(), tokens, &SessionConfig { max_issue_attempts: 3 });
        Ok(Some(Self { store, services }))
    }

    async fn signup(&self, name: &str) -> Result<User> {
        let email = format!("{}-{}@example.com", name, Uuid::new_v4().simple());
        Ok(self.services.accounts.signup(name, &email, "secret1").await?)
    }
}

fn drafts(value: serde_json::Value) -> Result<Vec<ElementDraft>> {
    Ok(serde_json::from_value(value)?)
}

#[tokio::test]
async fn folder_delete_reparents_and_form_delete_cascades() -> Result<()> {
    let Some(ctx) = PgContext::connect().await? else { return Ok(()) };
    let owner = ctx.signup("pg-owner").await?;
    let ws = owner.workspace_id;
    let svc = &ctx.services.workspaces;

    let folder = svc.create_folder(owner.id, ws, "Archive").await?;
    let kept = svc.create_form(owner.id, ws, Some(folder.id), "Kept").await?;
    let doomed = svc.create_form(owner.id, ws, None, "Doomed").await?;

    svc.delete_folder(owner.id, ws, folder.id).await?;
    let kept = ctx.store.find_form(kept.id).await?.context("re-parented form")?;
    assert!(kept.folder_id.is_none());
    let workspace = ctx.store.find_workspace(ws).await?.context("workspace")?;
    assert!(workspace.folders.is_empty());
    assert!(workspace.forms.contains(&kept.id));

    let elements = svc
        .save_form_elements(
            owner.id,
            doomed.id,
            drafts(json!([{"id": "q1", "type": "Text", "label": "Name", "required": true}]))?,
        )
        .await?;
    let session = ctx.services.responses.issue_session(doomed.id).await?;
    ctx.services
        .responses
        .record_response(session, doomed.id, elements[0].id, "Ada".into())
        .await?;

    svc.delete_form(owner.id, ws, doomed.id, None).await?;
    assert!(ctx.store.find_form(doomed.id).await?.is_none());
    assert!(ctx.store.find_elements(&[elements[0].id]).await?.is_empty());
    assert!(ctx.store.list_entries(doomed.id).await?.is_empty());

    let err = svc.delete_form(owner.id, ws, doomed.id, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn concurrent_first_answers_open_one_entry() -> Result<()> {
    let Some(ctx) = PgContext::connect().await? else { return Ok(()) };
    let owner = ctx.signup("pg-race").await?;
    let form = ctx
        .services
        .workspaces
        .create_form(owner.id, owner.workspace_id, None, "Race")
        .await?;
    let elements = ctx
        .services
        .workspaces
        .save_form_elements(
            owner.id,
            form.id,
            drafts(json!([
                {"id": "a", "type": "Text", "required": true},
                {"id": "b", "type": "Email"}
            ]))?,
        )
        .await?;

    let form_id = form.id;
    let session = ctx.services.responses.issue_session(form_id).await?;
    let mut tasks = Vec::new();
    for (i, element) in elements.iter().cycle().take(8).enumerate() {
        let responses = ctx.services.responses.clone();
        let element_id = element.id;
        tasks.push(tokio::spawn(async move {
            responses
                .record_response(session, form_id, element_id, format!("answer {}", i))
                .await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let entries = ctx.store.list_entries(form.id).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].responses.len(), 2);

    let form_now = ctx.store.find_form(form.id).await?.context("form")?;
    assert_eq!(form_now.view_count, 1);
    assert_eq!(form_now.start_count, 1);
    Ok(())
}

#[tokio::test]
async fn submission_completes_exactly_once() -> Result<()> {
    let Some(ctx) = PgContext::connect().await? else { return Ok(()) };
    let owner = ctx.signup("pg-submit").await?;
    let form = ctx
        .services
        .workspaces
        .create_form(owner.id, owner.workspace_id, None, "Submit")
        .await?;
    let elements = ctx
        .services
        .workspaces
        .save_form_elements(
            owner.id,
            form.id,
            drafts(json!([
                {"id": "name", "type": "Text", "required": true},
                {"id": "logo", "type": "Image", "link": "https://example.com/logo.png"}
            ]))?,
        )
        .await?;
    let responses = &ctx.services.responses;

    let session = responses.issue_session(form.id).await?;
    responses
        .record_response(session, form.id, elements[0].id, "   ".into())
        .await?;
    let err = responses.submit_form(session, form.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::IncompleteSubmission));

    responses
        .record_response(session, form.id, elements[0].id, "Ada".into())
        .await?;
    let (a, b) = tokio::join!(
        responses.submit_form(session, form.id),
        responses.submit_form(session, form.id)
    );
    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one submit wins"
    );

    let err = responses
        .record_response(session, form.id, elements[0].id, "Grace".into())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let summary = responses.aggregate_responses(form.id).await?;
    assert_eq!(summary.counters.completed_count, 1);
    assert_eq!(summary.elements.len(), 1);
    assert_eq!(summary.entries[0].responses[0].value, "Ada");
    Ok(())
}
