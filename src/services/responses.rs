use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::database::models::{
    Element, EntryUpdate, Form, FormCounter, FormCounters, FormEntry, Response, SessionId,
};
use crate::database::Store;
use crate::services::access::AccessResolver;
use crate::services::error::{ServiceError, ServiceResult};

/// Form counters, input-collecting element headers and one row per session
#[derive(Debug, Serialize)]
pub struct FormResponses {
    pub form_id: Uuid,
    pub form_name: String,
    pub counters: FormCounters,
    pub elements: Vec<Element>,
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Serialize)]
pub struct EntrySummary {
    pub session_id: SessionId,
    pub submitted_at: DateTime<Utc>,
    pub is_completed: bool,
    pub responses: Vec<Response>,
}

/// Session-scoped response collection.
///
/// Per (form, session) the entry moves `NoEntry -> Started -> Completed`.
/// The entry is created by the first answer and completion is terminal.
#[derive(Clone)]
pub struct ResponseService {
    store: Arc<dyn Store>,
    access: AccessResolver,
    max_issue_attempts: u32,
}

impl ResponseService {
    pub fn new(store: Arc<dyn Store>, access: AccessResolver, sessions: &SessionConfig) -> Self {
        Self {
            store,
            access,
            max_issue_attempts: sessions.max_issue_attempts.max(1),
        }
    }

    /// Hand out a fresh session for the form and count the view.
    /// No entry exists until the first answer arrives.
    pub async fn issue_session(&self, form_id: Uuid) -> ServiceResult<SessionId> {
        self.find_form(form_id).await?;

        let mut session_id = None;
        for attempt in 1..=self.max_issue_attempts {
            let candidate = SessionId::generate();
            if !self.store.session_in_use(candidate).await? {
                session_id = Some(candidate);
                break;
            }
            warn!(%form_id, attempt, "session id collision, regenerating");
        }
        let session_id = session_id.ok_or_else(|| {
            ServiceError::internal(format!(
                "no unused session id after {} attempts",
                self.max_issue_attempts
            ))
        })?;

        if !self.store.increment_form_counter(form_id, FormCounter::Views).await? {
            return Err(ServiceError::not_found("Form not found"));
        }

        debug!(%form_id, %session_id, "issued session");
        Ok(session_id)
    }

    /// Store one answer. The first answer of a session opens its entry and counts
    /// the start; later answers to the same element overwrite in place.
    pub async fn record_response(
        &self,
        session_id: SessionId,
        form_id: Uuid,
        element_id: Uuid,
        value: String,
    ) -> ServiceResult<()> {
        let form = self.find_form(form_id).await?;
        if !form.elements.contains(&element_id) {
            return Err(ServiceError::not_found("Element not found on this form"));
        }
        let element = self
            .store
            .find_elements(&[element_id])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Element not found on this form"))?;
        if !element.collects_input() {
            return Err(ServiceError::invalid_input(format!(
                "{} elements do not accept responses",
                element.element_type.as_str()
            )));
        }

        let response = Response { element_id, value };

        if self.store.find_entry(form_id, session_id).await?.is_none() {
            let entry = FormEntry::start(form_id, session_id, response.clone());
            if self.store.start_entry(&entry).await? {
                info!(%form_id, %session_id, "session started");
                return Ok(());
            }
            // Lost the race to open the entry; fall through and write into the winner's
            debug!(%form_id, %session_id, "entry opened concurrently");
        }

        match self.store.record_response(form_id, session_id, &response).await? {
            EntryUpdate::Applied => Ok(()),
            EntryUpdate::AlreadyCompleted => {
                warn!(%form_id, %session_id, "response to a submitted entry");
                Err(ServiceError::conflict("This form has already been submitted"))
            }
            EntryUpdate::Missing => Err(ServiceError::not_found("No entry for this session")),
        }
    }

    /// Complete the session's entry once every required question has a non-blank answer
    pub async fn submit_form(&self, session_id: SessionId, form_id: Uuid) -> ServiceResult<()> {
        let form = self.find_form(form_id).await?;
        let entry = self
            .store
            .find_entry(form_id, session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("No responses recorded for this session"))?;
        if entry.is_completed {
            return Err(ServiceError::conflict("This form has already been submitted"));
        }

        let elements = self.store.find_elements(&form.elements).await?;
        let unanswered = elements
            .iter()
            .filter(|e| e.required && e.collects_input())
            .any(|e| {
                entry
                    .response_for(e.id)
                    .map_or(true, |r| r.value.trim().is_empty())
            });
        if unanswered {
            return Err(ServiceError::IncompleteSubmission);
        }

        match self.store.complete_entry(form_id, session_id).await? {
            EntryUpdate::Applied => {
                info!(%form_id, %session_id, "form submitted");
                Ok(())
            }
            EntryUpdate::AlreadyCompleted => {
                warn!(%form_id, %session_id, "lost race to submit");
                Err(ServiceError::conflict("This form has already been submitted"))
            }
            EntryUpdate::Missing => Err(ServiceError::not_found("No responses recorded for this session")),
        }
    }

    /// Join the form's input elements with every entry. Read-only.
    pub async fn aggregate_responses(&self, form_id: Uuid) -> ServiceResult<FormResponses> {
        let form = self.find_form(form_id).await?;

        let elements: Vec<Element> = self
            .store
            .find_elements(&form.elements)
            .await?
            .into_iter()
            .filter(Element::collects_input)
            .collect();

        let entries = self
            .store
            .list_entries(form_id)
            .await?
            .into_iter()
            .map(|entry| EntrySummary {
                session_id: entry.session_id,
                submitted_at: entry.updated_at,
                is_completed: entry.is_completed,
                responses: entry
                    .responses
                    .into_iter()
                    .filter(|r| elements.iter().any(|e| e.id == r.element_id))
                    .collect(),
            })
            .collect();

        Ok(FormResponses {
            form_id: form.id,
            form_name: form.name.clone(),
            counters: form.counters(),
            elements,
            entries,
        })
    }

    /// Aggregated responses for a member of the form's workspace
    pub async fn form_responses(&self, user_id: Uuid, form_id: Uuid) -> ServiceResult<FormResponses> {
        let form = self.find_form(form_id).await?;
        self.access.require_view(user_id, form.workspace_id).await?;
        self.aggregate_responses(form.id).await
    }

    async fn find_form(&self, form_id: Uuid) -> ServiceResult<Form> {
        self.store
            .find_form(form_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Form not found"))
    }
}
