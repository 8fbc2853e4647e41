use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Anonymous respondent session token.
///
/// The token is a bearer capability: whoever holds it may record answers and
/// submit on behalf of the session. It carries no identity beyond itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Time-ordered v7 id, so concurrent issuance does not collide in practice
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub element_id: Uuid,
    pub value: String,
}

/// One session's answers to one form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormEntry {
    pub id: Uuid,
    pub form_id: Uuid,
    pub session_id: SessionId,
    pub responses: Vec<Response>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormEntry {
    pub fn start(form_id: Uuid, session_id: SessionId, first: Response) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            form_id,
            session_id,
            responses: vec![first],
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn response_for(&self, element_id: Uuid) -> Option<&Response> {
        self.responses.iter().find(|r| r.element_id == element_id)
    }

    /// Overwrite the answer for the element in place, or append it.
    pub fn upsert_response(&mut self, response: Response) {
        match self
            .responses
            .iter_mut()
            .find(|r| r.element_id == response.element_id)
        {
            Some(existing) => existing.value = response.value,
            None => self.responses.push(response),
        }
        self.updated_at = Utc::now();
    }

    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.is_completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;
    }
}

/// Outcome of a conditional write against an existing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryUpdate {
    Applied,
    Missing,
    AlreadyCompleted,
}
