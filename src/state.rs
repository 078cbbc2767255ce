use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::repository::{CredentialStore, TaskRepository};
use crate::store::{TaskStore, UserStore};

/// Everything a request handler needs, built once and shared via `web::Data`.
pub struct AppState {
    pub users: CredentialStore,
    pub tasks: TaskRepository,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Wires both repositories to the same backend.
    pub fn new<S>(store: Arc<S>, tokens: TokenService, hasher: PasswordHasher) -> Self
    where
        S: UserStore + TaskStore + 'static,
    {
        Self {
            users: CredentialStore::new(store.clone()),
            tasks: TaskRepository::new(store),
            tokens: Arc::new(tokens),
            hasher,
        }
    }
}
