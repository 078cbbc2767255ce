use async_trait::async_trait;
use sqlx::PgPool;

use super::{unknown_owner, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskInput, User};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at, deleted_at";
const TASK_COLUMNS: &str =
    "id, title, description, completed, user_id, created_at, updated_at, deleted_at";

/// Row filter shared by every task read and write: `$1` is the task id,
/// `$2` the owner.
const OWNED_ACTIVE_TASK: &str = "id = $1 AND user_id = $2 AND deleted_at IS NULL";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email)",
    "CREATE TABLE IF NOT EXISTS tasks (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        user_id BIGINT NOT NULL REFERENCES users (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks (user_id) WHERE deleted_at IS NULL",
];

/// Postgres-backed implementation of both store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables and indexes if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Empties both tables and resets their id sequences.
    pub async fn truncate_all(&self) -> Result<(), AppError> {
        sqlx::query("TRUNCATE TABLE tasks, users RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
                other => other,
            })
    }

    async fn soft_delete_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS);
        let existing = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        match existing {
            None => return Ok(None),
            Some(user) if user.is_deleted() => {
                log::debug!("User {} is already deleted", id);
                return Ok(None);
            }
            Some(_) => {}
        }

        let cascaded = sqlx::query(
            "UPDATE tasks SET deleted_at = NOW() WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        log::debug!(
            "Soft-deleted user {} and {} owned task(s)",
            id,
            cascaded.rows_affected()
        );
        Ok(Some(user))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 AND deleted_at IS NULL",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn insert_task(&self, owner_id: i64, input: &TaskInput) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, completed, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.completed)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await;

        match task {
            Ok(task) => Ok(task),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(unknown_owner(owner_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE {}", TASK_COLUMNS, OWNED_ACTIVE_TASK);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        input: &TaskInput,
    ) -> Result<Option<Task>, AppError> {
        // Writes only when something differs, so an identical payload leaves
        // updated_at alone.
        let sql = format!(
            "UPDATE tasks
             SET title = $3, description = $4, completed = $5, updated_at = NOW()
             WHERE {} AND NOT (title = $3 AND description = $4 AND completed = $5)
             RETURNING {}",
            OWNED_ACTIVE_TASK, TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.completed)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(task) => Ok(Some(task)),
            None => self.find_task(id, owner_id).await,
        }
    }

    async fn soft_delete_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Includes already-deleted rows so the two "not found" cases can be told apart.
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2 FOR UPDATE",
            TASK_COLUMNS
        );
        let existing = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        match existing {
            None => return Ok(None),
            Some(task) if task.is_deleted() => {
                log::debug!("Task {} is already deleted", id);
                return Ok(None);
            }
            Some(_) => {}
        }

        let sql = format!(
            "UPDATE tasks SET deleted_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(task))
    }
}
