/// Board model and database operations
///
/// A board belongs to exactly one user and keeps the ordered list of its task
/// ids in `task_ids`. The list is written in the same transaction as the task
/// row it refers to, see [`PgStore`](crate::store::postgres::PgStore).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_ids UUID[] NOT NULL DEFAULT '{}',
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
use super::task::{Task, TaskDetail};

/// Board row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// Owning user
    pub user_id: Uuid,

    /// Task ids in insertion order, no duplicates
    #[serde(rename = "tasks")]
    pub task_ids: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub name: String,
}

/// Partial board update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct BoardChanges {
    pub name: Option<String>,
}

/// A board with its tasks and their subtasks expanded, one level each.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub tasks: Vec<TaskDetail>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardDetail {
    /// Nests `tasks` under `board` and `subtasks` under their tasks, following
    /// the order of the parents' child-id lists. Subtasks of other tasks are
    /// ignored.
    pub fn assemble(board: Board, tasks: Vec<Task>, subtasks: Vec<Subtask>) -> Self {
        let tasks = order_by_ids(&board.task_ids, tasks, |task| task.id)
            .into_iter()
            .map(|task| {
                let own: Vec<Subtask> = subtasks
                    .iter()
                    .filter(|subtask| subtask.task_id == task.id)
                    .cloned()
                    .collect();
                TaskDetail::assemble(task, own)
            })
            .collect();

        Self {
            id: board.id,
            name: board.name,
            user_id: board.user_id,
            tasks,
            created_at: board.created_at,
            updated_at: board.updated_at,
        }
    }
}

/// What a board deletion removed
#[derive(Debug, Clone)]
pub struct BoardDeletion {
    pub board: Board,
    pub tasks_deleted: u64,
    pub subtasks_deleted: u64,
}

impl Board {
    /// Inserts a board with an empty task list
    pub async fn create<'e, E>(executor: E, user_id: Uuid, data: NewBoard) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (name, user_id)
            VALUES ($1, $2)
            RETURNING id, name, user_id, task_ids, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a board owned by `user_id`
    pub async fn find_owned<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, user_id, task_ids, created_at, updated_at
            FROM boards
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Same as [`find_owned`](Self::find_owned) but locks the row until the
    /// surrounding transaction ends. Used before touching `task_ids`.
    pub async fn find_owned_for_update<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, user_id, task_ids, created_at, updated_at
            FROM boards
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a user's boards, oldest first
    pub async fn list_by_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, user_id, task_ids, created_at, updated_at
            FROM boards
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Applies a partial update to an owned board
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        changes: BoardChanges,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = COALESCE($3, name),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, name, user_id, task_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.name)
        .fetch_optional(executor)
        .await
    }

    /// Appends a task id unless it is already listed
    pub async fn append_task<'e, E>(executor: E, id: Uuid, task_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE boards
            SET task_ids = array_append(task_ids, $2),
                updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(task_ids))
            "#,
        )
        .bind(id)
        .bind(task_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a task id, keeping the order of the others
    pub async fn remove_task<'e, E>(executor: E, id: Uuid, task_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE boards
            SET task_ids = array_remove(task_ids, $2),
                updated_at = NOW()
            WHERE id = $1 AND $2 = ANY(task_ids)
            "#,
        )
        .bind(id)
        .bind(task_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the board row. Tasks and subtasks must be removed first by the
    /// caller if their counts matter; the foreign keys cascade otherwise.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
