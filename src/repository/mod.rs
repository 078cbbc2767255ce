//! Ownership-scoped operations the HTTP layer calls into.
//!
//! [`CredentialStore`] owns the user lifecycle and [`TaskRepository`] the task
//! lifecycle. Both wrap a shared backend handle and turn "absent" results into
//! the right [`crate::error::AppError`] variant.

pub mod tasks;
pub mod users;

pub use tasks::TaskRepository;
pub use users::CredentialStore;
