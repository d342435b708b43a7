/// Storage traits
///
/// Handlers never talk to the database directly. They go through two traits:
///
/// - [`CredentialStore`]: users and the revoked-token list
/// - [`GraphStore`]: the Board → Task → Subtask hierarchy
///
/// [`Store`] combines both with a liveness check and is what the API server
/// holds (as `Arc<dyn Store>`).
///
/// # Referential integrity
///
/// Every `GraphStore` method that touches both a child and its parent's
/// child-id list is atomic: either both writes land or neither does.
/// [`postgres::PgStore`] uses a transaction with the parent row locked,
/// [`memory::MemoryStore`] holds a single lock for the whole operation.
///
/// # Ownership
///
/// Every graph method takes the requesting user's id. Tasks and subtasks are
/// only reachable through a board owned by that user; anything else is
/// reported as [`StoreError::NotFound`] (or an empty list for listings).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{
    board::{Board, BoardChanges, BoardDeletion, BoardDetail, NewBoard},
    subtask::{NewSubtask, Subtask, SubtaskChanges},
    task::{NewTask, Task, TaskChanges},
    user::{NewUser, User},
};

/// Kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Board,
    Task,
    Subtask,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Board => "Board",
            Entity::Task => "Task",
            Entity::Subtask => "Subtask",
        };
        f.write_str(name)
    }
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record does not exist or is not visible to the caller
    #[error("{0} not found")]
    NotFound(Entity),

    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Users and revoked tokens
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user. A duplicate email is [`StoreError::Conflict`].
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Adds a token to the revoked list. Idempotent; returns `true` only for
    /// the call that actually inserted the token.
    async fn revoke_token(&self, token: &str) -> StoreResult<bool>;

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool>;
}

/// Board → Task → Subtask hierarchy, scoped by owner
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn create_board(&self, owner: Uuid, board: NewBoard) -> StoreResult<Board>;

    /// Boards owned by `owner`, oldest first
    async fn list_boards(&self, owner: Uuid) -> StoreResult<Vec<Board>>;

    /// The board with its tasks and their subtasks
    async fn board_detail(&self, owner: Uuid, board_id: Uuid) -> StoreResult<BoardDetail>;

    async fn update_board(
        &self,
        owner: Uuid,
        board_id: Uuid,
        changes: BoardChanges,
    ) -> StoreResult<Board>;

    /// Deletes the board, its tasks and their subtasks
    async fn delete_board(&self, owner: Uuid, board_id: Uuid) -> StoreResult<BoardDeletion>;

    /// Creates a task and links it into the board's task list.
    /// Missing board: [`StoreError::NotFound`]`(Board)`.
    async fn create_task(&self, owner: Uuid, board_id: Uuid, task: NewTask) -> StoreResult<Task>;

    /// Tasks of a board; empty for a missing or foreign board
    async fn list_tasks(&self, owner: Uuid, board_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn update_task(&self, owner: Uuid, task_id: Uuid, changes: TaskChanges)
        -> StoreResult<Task>;

    /// Unlinks the task from its board and deletes it with its subtasks.
    /// Returns the deleted task.
    async fn delete_task(&self, owner: Uuid, task_id: Uuid) -> StoreResult<Task>;

    /// Creates a subtask and links it into the task's subtask list.
    /// Missing task: [`StoreError::NotFound`]`(Task)`.
    async fn create_subtask(
        &self,
        owner: Uuid,
        task_id: Uuid,
        subtask: NewSubtask,
    ) -> StoreResult<Subtask>;

    /// Subtasks of a task; empty for a missing or foreign task
    async fn list_subtasks(&self, owner: Uuid, task_id: Uuid) -> StoreResult<Vec<Subtask>>;

    async fn update_subtask(
        &self,
        owner: Uuid,
        subtask_id: Uuid,
        changes: SubtaskChanges,
    ) -> StoreResult<Subtask>;

    /// Unlinks the subtask from its task and deletes it. A subtask whose task
    /// is gone is [`StoreError::NotFound`]`(Task)`.
    async fn delete_subtask(&self, owner: Uuid, subtask_id: Uuid) -> StoreResult<()>;
}

/// Complete storage backend
#[async_trait]
pub trait Store: CredentialStore + GraphStore {
    /// Name reported by health checks
    fn backend(&self) -> &'static str;

    /// Verifies the backend answers
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        assert_eq!(StoreError::NotFound(Entity::Board).to_string(), "Board not found");
        assert_eq!(StoreError::NotFound(Entity::Subtask).to_string(), "Subtask not found");
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
