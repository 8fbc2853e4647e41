pub mod access;
pub mod account;
pub mod error;
pub mod responses;
pub mod sharing;
pub mod workspace;

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::SessionConfig;
use crate::database::Store;

pub use access::{Access, AccessResolver};
pub use account::{AccountService, LoginSession};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use responses::{EntrySummary, FormResponses, ResponseService};
pub use sharing::SharingService;
pub use workspace::{
    FolderDetail, Listing, PublicForm, Summary, WorkspaceOverview, WorkspaceService, WorkspaceSummary,
};

/// Every service, wired to one shared store
#[derive(Clone)]
pub struct Services {
    pub access: AccessResolver,
    pub workspaces: WorkspaceService,
    pub responses: ResponseService,
    pub sharing: SharingService,
    pub accounts: AccountService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer, sessions: &SessionConfig) -> Self {
        let access = AccessResolver::new(store.clone());
        Self {
            workspaces: WorkspaceService::new(store.clone(), access.clone()),
            responses: ResponseService::new(store.clone(), access.clone(), sessions),
            sharing: SharingService::new(store.clone()),
            accounts: AccountService::new(store, tokens),
            access,
        }
    }
}
