//! Storage backends.
//!
//! The traits here are the contract every backend honours; the repository
//! types in [`crate::repository`] sit on top of them and are what handlers
//! talk to. Two implementations ship with the crate: [`PgStore`] for
//! Postgres and [`MemoryStore`] for isolated in-process instances.
//!
//! Each backend is responsible for making its operations atomic: a duplicate
//! email must fail on insert even if a concurrent request already passed the
//! lookup, an unchanged update must not write, and a user delete must take
//! that user's tasks with it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Task, TaskInput, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A task insert for an owner with no user row. The caller holds a valid
/// token for an account that is gone, so this is a credential failure.
pub(crate) fn unknown_owner(owner_id: i64) -> AppError {
    log::debug!("Rejected task insert for missing user {}", owner_id);
    AppError::Unauthorized("User no longer exists".into())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Active (not soft-deleted) user with exactly this email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Inserts a user. Fails with `Conflict` if the email is already taken,
    /// including by a soft-deleted user.
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    /// Soft-deletes the user and every task they own.
    ///
    /// `None` if the user never existed or is already deleted; nothing is
    /// written in that case.
    async fn soft_delete_user(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Cheap reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Task persistence. Every method is scoped by `owner_id`; a task owned by
/// someone else behaves exactly like a task that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, AppError>;

    async fn insert_task(&self, owner_id: i64, input: &TaskInput) -> Result<Task, AppError>;

    async fn find_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, AppError>;

    /// Replaces title, description and completed. When they already hold
    /// these values the stored row is returned untouched.
    async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        input: &TaskInput,
    ) -> Result<Option<Task>, AppError>;

    /// Marks the task deleted. `None` if it never existed, belongs to
    /// another owner, or was already deleted.
    async fn soft_delete_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, AppError>;
}
