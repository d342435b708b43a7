/// Task model and database operations
///
/// Tasks live inside a board and keep the ordered ids of their subtasks in
/// `subtask_ids`. Every query that reaches a task by its own id joins
/// `boards` so the caller only sees tasks on boards they own.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status VARCHAR(100) NOT NULL,
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     subtask_ids UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use utoipa::ToSchema;
use uuid::Uuid;

use super::order_by_ids;
use super::subtask::Subtask;

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Free-form status label such as "Todo" or "Doing"
    pub status: String,

    /// Parent board
    pub board_id: Uuid,

    /// Subtask ids in insertion order, no duplicates
    #[serde(rename = "subtasks")]
    pub subtask_ids: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}

/// Partial task update
///
/// `None` leaves a field unchanged. `description: Some(None)` clears the
/// description.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<String>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// Applies the changes to an in-memory task
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// A task with its subtasks expanded
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub board_id: Uuid,
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDetail {
    /// Nests `subtasks` under `task` in the order of `task.subtask_ids`
    pub fn assemble(task: Task, subtasks: Vec<Subtask>) -> Self {
        let subtasks = order_by_ids(&task.subtask_ids, subtasks, |subtask| subtask.id);

        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            board_id: task.board_id,
            subtasks,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl Task {
    /// Inserts a task under `board_id`. Linking it into the board's list is
    /// a separate write, see [`Board::append_task`](super::board::Board::append_task).
    pub async fn create<'e, E>(executor: E, board_id: Uuid, data: NewTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, board_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, status, board_id, subtask_ids,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(board_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a task on a board owned by `user_id`, without locking
    pub async fn find_owned<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.board_id, t.subtask_ids,
                   t.created_at, t.updated_at
            FROM tasks t
            JOIN boards b ON b.id = t.board_id
            WHERE t.id = $1 AND b.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Locks the task row until the surrounding transaction ends.
    ///
    /// Callers lock the board row first (see
    /// [`Board::find_owned_for_update`](super::board::Board::find_owned_for_update)).
    /// Board before task is the one lock order used anywhere, so a task
    /// delete never deadlocks against a board delete. Yields `None` when the
    /// task is gone or moved off `board_id`.
    pub async fn lock_on_board<'e, E>(
        executor: E,
        id: Uuid,
        board_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, board_id, subtask_ids,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1 AND board_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(board_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists the tasks of a board owned by `user_id`, oldest first.
    ///
    /// A missing or foreign board yields an empty list.
    pub async fn list_by_board<'e, E>(
        executor: E,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.board_id, t.subtask_ids,
                   t.created_at, t.updated_at
            FROM tasks t
            JOIN boards b ON b.id = t.board_id
            WHERE t.board_id = $1 AND b.user_id = $2
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Applies a partial update to an owned task
    ///
    /// Only the fields present in `changes` are written, so an explicit empty
    /// string still replaces the stored value.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE tasks t SET updated_at = NOW()");
        let mut bind_count = 2;

        if changes.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if changes.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if changes.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(
            " FROM boards b WHERE t.id = $1 AND b.id = t.board_id AND b.user_id = $2 \
             RETURNING t.id, t.title, t.description, t.status, t.board_id, t.subtask_ids, \
             t.created_at, t.updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(user_id);

        if let Some(title) = changes.title {
            q = q.bind(title);
        }
        if let Some(description) = changes.description {
            q = q.bind(description);
        }
        if let Some(status) = changes.status {
            q = q.bind(status);
        }

        q.fetch_optional(executor).await
    }

    /// Appends a subtask id unless it is already listed
    pub async fn append_subtask<'e, E>(
        executor: E,
        id: Uuid,
        subtask_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET subtask_ids = array_append(subtask_ids, $2),
                updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(subtask_ids))
            "#,
        )
        .bind(id)
        .bind(subtask_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a subtask id, keeping the order of the others
    pub async fn remove_subtask<'e, E>(
        executor: E,
        id: Uuid,
        subtask_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET subtask_ids = array_remove(subtask_ids, $2),
                updated_at = NOW()
            WHERE id = $1 AND $2 = ANY(subtask_ids)
            "#,
        )
        .bind(id)
        .bind(subtask_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every task of a board without an ownership check. Callers must
    /// have verified the board already.
    pub async fn list_for_board<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, board_id, subtask_ids, created_at, updated_at
            FROM tasks
            WHERE board_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Deletes one task row
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task of a board, returning how many were removed
    pub async fn delete_by_board<'e, E>(executor: E, board_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE board_id = $1")
            .bind(board_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
