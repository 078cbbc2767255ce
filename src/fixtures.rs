//! Known users and tasks loaded at startup in `TEST` mode.

use crate::error::AppError;
use crate::models::TaskInput;
use crate::state::AppState;

/// `(email, password, task title, task description)`, in insertion order.
pub const SEED_USERS: &[(&str, &str, &str, &str)] = &[
    ("leon@gmail.com", "leon123", "Learn Go", "Study Go basics"),
    ("youssef@hotmail.com", "youssef123", "Build API", "Create a REST API"),
];

/// Creates every seed user with one task each, through the public repository operations.
pub async fn seed(state: &AppState) -> Result<(), AppError> {
    for (email, password, title, description) in SEED_USERS {
        let password_hash = state.hasher.hash(password)?;
        let user = state.users.create(email, &password_hash).await?;

        let input = TaskInput {
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
        };
        state.tasks.create(&input, user.id).await?;
    }
    Ok(())
}
