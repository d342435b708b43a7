/// PostgreSQL storage backend
///
/// Dual writes (child row + parent child-id list) run inside one transaction
/// with the parent row locked `FOR UPDATE`, so concurrent creates on the same
/// parent serialize and a failure part way leaves nothing behind. Dropping an
/// in-flight future (request timeout, client disconnect) rolls the
/// transaction back.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{CredentialStore, Entity, GraphStore, Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::{
    board::{Board, BoardChanges, BoardDeletion, BoardDetail, NewBoard},
    revoked_token::RevokedToken,
    subtask::{NewSubtask, Subtask, SubtaskChanges},
    task::{NewTask, Task, TaskChanges},
    user::{NewUser, User},
};

/// Locks the board of an owned task, then the task itself.
///
/// Every transaction that locks both rows goes board first, the same order
/// [`GraphStore::delete_board`] uses, so concurrent deletes queue instead of
/// deadlocking. A task that disappears between the lookup and the lock is
/// [`StoreError::NotFound`]`(Task)`.
async fn lock_owned_task(conn: &mut PgConnection, owner: Uuid, task_id: Uuid) -> StoreResult<Task> {
    let task = Task::find_owned(&mut *conn, task_id, owner)
        .await?
        .ok_or(StoreError::NotFound(Entity::Task))?;

    Board::find_owned_for_update(&mut *conn, task.board_id, owner)
        .await?
        .ok_or(StoreError::NotFound(Entity::Task))?;

    Task::lock_on_board(&mut *conn, task_id, task.board_id)
        .await?
        .ok_or(StoreError::NotFound(Entity::Task))
}

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn revoke_token(&self, token: &str) -> StoreResult<bool> {
        Ok(RevokedToken::insert(&self.pool, token).await?)
    }

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool> {
        Ok(RevokedToken::exists(&self.pool, token).await?)
    }
}

#[async_trait]
impl GraphStore for PgStore {
    async fn create_board(&self, owner: Uuid, board: NewBoard) -> StoreResult<Board> {
        Ok(Board::create(&self.pool, owner, board).await?)
    }

    async fn list_boards(&self, owner: Uuid) -> StoreResult<Vec<Board>> {
        Ok(Board::list_by_user(&self.pool, owner).await?)
    }

    async fn board_detail(&self, owner: Uuid, board_id: Uuid) -> StoreResult<BoardDetail> {
        // One snapshot for the three reads
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let board = Board::find_owned(&mut *tx, board_id, owner)
            .await?
            .ok_or(StoreError::NotFound(Entity::Board))?;
        let tasks = Task::list_for_board(&mut *tx, board_id).await?;
        let subtasks = Subtask::list_for_board(&mut *tx, board_id).await?;

        tx.commit().await?;

        debug!(
            board_id = %board_id,
            tasks = tasks.len(),
            subtasks = subtasks.len(),
            "Loaded board detail"
        );
        Ok(BoardDetail::assemble(board, tasks, subtasks))
    }

    async fn update_board(
        &self,
        owner: Uuid,
        board_id: Uuid,
        changes: BoardChanges,
    ) -> StoreResult<Board> {
        Board::update(&self.pool, board_id, owner, changes)
            .await?
            .ok_or(StoreError::NotFound(Entity::Board))
    }

    async fn delete_board(&self, owner: Uuid, board_id: Uuid) -> StoreResult<BoardDeletion> {
        let mut tx = self.pool.begin().await?;

        let board = Board::find_owned_for_update(&mut *tx, board_id, owner)
            .await?
            .ok_or(StoreError::NotFound(Entity::Board))?;

        let subtasks_deleted = Subtask::delete_by_board(&mut *tx, board_id).await?;
        let tasks_deleted = Task::delete_by_board(&mut *tx, board_id).await?;
        Board::delete(&mut *tx, board_id).await?;

        tx.commit().await?;

        info!(
            board_id = %board_id,
            tasks_deleted,
            subtasks_deleted,
            "Deleted board"
        );
        Ok(BoardDeletion {
            board,
            tasks_deleted,
            subtasks_deleted,
        })
    }

    async fn create_task(&self, owner: Uuid, board_id: Uuid, task: NewTask) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        Board::find_owned_for_update(&mut *tx, board_id, owner)
            .await?
            .ok_or(StoreError::NotFound(Entity::Board))?;

        let task = Task::create(&mut *tx, board_id, task).await?;
        Board::append_task(&mut *tx, board_id, task.id).await?;

        tx.commit().await?;
        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid, board_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_board(&self.pool, board_id, owner).await?)
    }

    async fn update_task(
        &self,
        owner: Uuid,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Task> {
        Task::update(&self.pool, task_id, owner, changes)
            .await?
            .ok_or(StoreError::NotFound(Entity::Task))
    }

    async fn delete_task(&self, owner: Uuid, task_id: Uuid) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        let task = lock_owned_task(&mut *tx, owner, task_id).await?;

        Board::remove_task(&mut *tx, task.board_id, task_id).await?;
        let subtasks_deleted = Subtask::delete_by_task(&mut *tx, task_id).await?;
        Task::delete(&mut *tx, task_id).await?;

        tx.commit().await?;

        debug!(task_id = %task_id, subtasks_deleted, "Deleted task");
        Ok(task)
    }

    async fn create_subtask(
        &self,
        owner: Uuid,
        task_id: Uuid,
        subtask: NewSubtask,
    ) -> StoreResult<Subtask> {
        let mut tx = self.pool.begin().await?;

        lock_owned_task(&mut *tx, owner, task_id).await?;

        let subtask = Subtask::create(&mut *tx, task_id, subtask).await?;
        Task::append_subtask(&mut *tx, task_id, subtask.id).await?;

        tx.commit().await?;
        Ok(subtask)
    }

    async fn list_subtasks(&self, owner: Uuid, task_id: Uuid) -> StoreResult<Vec<Subtask>> {
        Ok(Subtask::list_by_task(&self.pool, task_id, owner).await?)
    }

    async fn update_subtask(
        &self,
        owner: Uuid,
        subtask_id: Uuid,
        changes: SubtaskChanges,
    ) -> StoreResult<Subtask> {
        Subtask::update(&self.pool, subtask_id, owner, changes)
            .await?
            .ok_or(StoreError::NotFound(Entity::Subtask))
    }

    async fn delete_subtask(&self, owner: Uuid, subtask_id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // Foreign subtasks are indistinguishable from missing ones
        let subtask = Subtask::find_owned(&mut *tx, subtask_id, owner)
            .await?
            .ok_or(StoreError::NotFound(Entity::Subtask))?;

        lock_owned_task(&mut *tx, owner, subtask.task_id).await?;

        Task::remove_subtask(&mut *tx, subtask.task_id, subtask_id).await?;
        Subtask::delete(&mut *tx, subtask_id).await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
