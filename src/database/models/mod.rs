pub mod element;
pub mod entry;
pub mod folder;
pub mod form;
pub mod user;
pub mod workspace;

pub use element::{Element, ElementDraft, ElementType};
pub use entry::{EntryUpdate, FormEntry, Response, SessionId};
pub use folder::Folder;
pub use form::{Form, FormContainer, FormCounter, FormCounters};
pub use user::{AccessLevel, Theme, User, WorkspaceGrant};
pub use workspace::Workspace;
