use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::store::TaskStore;

/// Task CRUD, always on behalf of one owner.
///
/// A task is `Active` until deleted, then `SoftDeleted` for good. Tasks owned
/// by someone else are reported exactly like tasks that do not exist.
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn TaskStore>,
}

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

impl TaskRepository {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Every active task of `owner_id`, in no particular order.
    pub async fn list(&self, owner_id: i64) -> Result<Vec<Task>, AppError> {
        self.store.list_tasks(owner_id).await
    }

    pub async fn create(&self, input: &TaskInput, owner_id: i64) -> Result<Task, AppError> {
        input.validate()?;
        let task = self.store.insert_task(owner_id, input).await?;
        log::info!("User {} created task {}", owner_id, task.id);
        Ok(task)
    }

    pub async fn get_by_id(&self, id: i64, owner_id: i64) -> Result<Task, AppError> {
        self.store
            .find_task(id, owner_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Replaces the mutable fields. An identical payload is a no-op that
    /// returns the stored task with its timestamps untouched.
    pub async fn update(&self, id: i64, owner_id: i64, input: &TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        let task = self
            .store
            .update_task(id, owner_id, input)
            .await?
            .ok_or_else(not_found)?;
        log::info!("User {} updated task {}", owner_id, id);
        Ok(task)
    }

    /// Soft-deletes the task. A second delete of the same id is `NotFound`.
    pub async fn delete(&self, id: i64, owner_id: i64) -> Result<Task, AppError> {
        let task = self
            .store
            .soft_delete_task(id, owner_id)
            .await?
            .ok_or_else(not_found)?;
        log::info!("User {} deleted task {}", owner_id, id);
        Ok(task)
    }
}
