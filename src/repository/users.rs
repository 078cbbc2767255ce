use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn UserStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Exact, case-sensitive match among active users.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.store.find_user_by_email(email).await
    }

    /// Persists a new user with an already-computed hash.
    ///
    /// The backend's uniqueness constraint is the authority here: two
    /// concurrent registrations for one email yield exactly one user and one
    /// `Conflict`.
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let user = self.store.insert_user(email, password_hash).await?;
        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Soft-deletes the user after soft-deleting every task they own.
    pub async fn delete(&self, id: i64) -> Result<User, AppError> {
        let user = self
            .store
            .soft_delete_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        log::info!("Deleted user {}", id);
        Ok(user)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
