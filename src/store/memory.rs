use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{unknown_owner, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskInput, User};

/// In-process store with the same semantics as [`super::PgStore`].
///
/// Each instance is fully isolated, which makes it the backend of choice for
/// tests. All mutations happen under one write lock, so the read-modify-write
/// operations are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_task_id: i64,
}

impl Inner {
    fn owned_task_mut(&mut self, id: i64, owner_id: i64) -> Option<&mut Task> {
        self.tasks
            .get_mut(&id)
            .filter(|task| task.user_id == owner_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.email == email && !user.is_deleted())
            .cloned())
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;

        // Same as the unique index: deleted users keep their email.
        if inner.users.values().any(|user| user.email == email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        inner.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.last_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn soft_delete_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().await;

        match inner.users.get(&id) {
            Some(user) if !user.is_deleted() => {}
            _ => return Ok(None),
        }

        let now = Utc::now();
        for task in inner.tasks.values_mut() {
            if task.user_id == id && !task.is_deleted() {
                task.deleted_at = Some(now);
            }
        }

        Ok(inner.users.get_mut(&id).map(|user| {
            user.deleted_at = Some(now);
            user.updated_at = now;
            user.clone()
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|task| task.user_id == owner_id && !task.is_deleted())
            .cloned()
            .collect())
    }

    async fn insert_task(&self, owner_id: i64, input: &TaskInput) -> Result<Task, AppError> {
        let mut inner = self.inner.write().await;

        // Mirrors the foreign key on tasks.user_id.
        if !inner.users.contains_key(&owner_id) {
            return Err(unknown_owner(owner_id));
        }

        inner.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.last_task_id,
            title: input.title.clone(),
            description: input.description.clone(),
            completed: input.completed,
            user_id: owner_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&id)
            .filter(|task| task.user_id == owner_id && !task.is_deleted())
            .cloned())
    }

    async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        input: &TaskInput,
    ) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().await;

        let task = match inner.owned_task_mut(id, owner_id) {
            Some(task) if !task.is_deleted() => task,
            _ => return Ok(None),
        };

        if !input.matches(task) {
            task.title = input.title.clone();
            task.description = input.description.clone();
            task.completed = input.completed;
            task.updated_at = Utc::now();
        }
        Ok(Some(task.clone()))
    }

    async fn soft_delete_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().await;

        match inner.owned_task_mut(id, owner_id) {
            Some(task) if task.is_deleted() => {
                log::debug!("Task {} is already deleted", id);
                Ok(None)
            }
            Some(task) => {
                task.deleted_at = Some(Utc::now());
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }
}
