use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub name: String,
    pub workspace_id: Uuid,
    /// None means the form lives at the top level of its workspace
    pub folder_id: Option<Uuid>,
    pub created_by: Uuid,
    pub elements: Vec<Uuid>,
    pub view_count: i64,
    pub start_count: i64,
    pub completed_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    pub fn new(
        name: impl Into<String>,
        workspace_id: Uuid,
        folder_id: Option<Uuid>,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            workspace_id,
            folder_id,
            created_by,
            elements: Vec::new(),
            view_count: 0,
            start_count: 0,
            completed_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn counters(&self) -> FormCounters {
        FormCounters {
            view_count: self.view_count,
            start_count: self.start_count,
            completed_count: self.completed_count,
        }
    }
}

/// The monotonically increasing analytics counters on a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCounter {
    Views,
    Starts,
    Completions,
}

impl FormCounter {
    pub fn column(&self) -> &'static str {
        match self {
            FormCounter::Views => "view_count",
            FormCounter::Starts => "start_count",
            FormCounter::Completions => "completed_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCounters {
    pub view_count: i64,
    pub start_count: i64,
    pub completed_count: i64,
}

/// Which back-reference list is expected to hold a form id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormContainer {
    Workspace(Uuid),
    Folder(Uuid),
}
