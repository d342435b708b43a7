/// Subtask model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subtasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use utoipa::ToSchema;
use uuid::Uuid;

/// Subtask row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,

    /// Parent task
    pub task_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a subtask
#[derive(Debug, Clone)]
pub struct NewSubtask {
    pub title: String,
    pub is_completed: bool,
}

/// Partial subtask update
///
/// `is_completed: Some(false)` is a real update, distinct from `None`.
#[derive(Debug, Clone, Default)]
pub struct SubtaskChanges {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl SubtaskChanges {
    /// Applies the changes to an in-memory subtask
    pub fn apply_to(self, subtask: &mut Subtask) {
        if let Some(title) = self.title {
            subtask.title = title;
        }
        if let Some(is_completed) = self.is_completed {
            subtask.is_completed = is_completed;
        }
    }
}

impl Subtask {
    /// Inserts a subtask under `task_id`
    pub async fn create<'e, E>(executor: E, task_id: Uuid, data: NewSubtask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO subtasks (title, is_completed, task_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, is_completed, task_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.is_completed)
        .bind(task_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a subtask whose task sits on a board owned by `user_id`
    pub async fn find_owned<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Subtask>(
            r#"
            SELECT s.id, s.title, s.is_completed, s.task_id, s.created_at, s.updated_at
            FROM subtasks s
            JOIN tasks t ON t.id = s.task_id
            JOIN boards b ON b.id = t.board_id
            WHERE s.id = $1 AND b.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists the subtasks of a task owned (through its board) by `user_id`
    pub async fn list_by_task<'e, E>(
        executor: E,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Subtask>(
            r#"
            SELECT s.id, s.title, s.is_completed, s.task_id, s.created_at, s.updated_at
            FROM subtasks s
            JOIN tasks t ON t.id = s.task_id
            JOIN boards b ON b.id = t.board_id
            WHERE s.task_id = $1 AND b.user_id = $2
            ORDER BY s.created_at ASC, s.id ASC
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Lists the subtasks of every task on a board. Used for the expanded
    /// board view after ownership has been checked.
    pub async fn list_for_board<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Subtask>(
            r#"
            SELECT s.id, s.title, s.is_completed, s.task_id, s.created_at, s.updated_at
            FROM subtasks s
            JOIN tasks t ON t.id = s.task_id
            WHERE t.board_id = $1
            ORDER BY s.created_at ASC, s.id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Applies a partial update to an owned subtask
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        changes: SubtaskChanges,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Subtask>(
            r#"
            UPDATE subtasks s
            SET title = COALESCE($3, s.title),
                is_completed = COALESCE($4, s.is_completed),
                updated_at = NOW()
            FROM tasks t
            JOIN boards b ON b.id = t.board_id
            WHERE s.id = $1 AND t.id = s.task_id AND b.user_id = $2
            RETURNING s.id, s.title, s.is_completed, s.task_id, s.created_at, s.updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.title)
        .bind(changes.is_completed)
        .fetch_optional(executor)
        .await
    }

    /// Deletes one subtask row
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every subtask of a task
    pub async fn delete_by_task<'e, E>(executor: E, task_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM subtasks WHERE task_id = $1")
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every subtask of every task on a board
    pub async fn delete_by_board<'e, E>(executor: E, board_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM subtasks
            WHERE task_id IN (SELECT id FROM tasks WHERE board_id = $1)
            "#,
        )
        .bind(board_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
