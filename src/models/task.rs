use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Client payload for creating or replacing a task.
///
/// Only these three fields are read from the request body. Any `id`,
/// `user_id` or timestamp the client sends is dropped during deserialization;
/// those are always assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must contain something other than whitespace.
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    /// Must contain something other than whitespace.
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,

    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: bool,
}

impl TaskInput {
    /// True when applying this input to `task` would change nothing.
    pub fn matches(&self, task: &Task) -> bool {
        self.title == task.title
            && self.description == task.description
            && self.completed == task.completed
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A task as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Server-assigned identifier, always positive.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Owning user. Set from the verified caller at creation, never changed.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; a task with this set is invisible to every read.
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
