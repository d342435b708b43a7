/// In-memory storage backend
///
/// Keeps every collection behind one async mutex, so each trait method is
/// atomic with respect to the others. Intended for tests and local
/// experiments; nothing survives a restart.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::board::NewBoard;
/// use taskboard_shared::store::{memory::MemoryStore, GraphStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
///
/// let board = store.create_board(owner, NewBoard { name: "Home".to_string() }).await?;
/// assert!(board.task_ids.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{CredentialStore, Entity, GraphStore, Store, StoreError, StoreResult};
use crate::models::{
    board::{Board, BoardChanges, BoardDeletion, BoardDetail, NewBoard},
    subtask::{NewSubtask, Subtask, SubtaskChanges},
    task::{NewTask, Task, TaskChanges},
    user::{NewUser, User},
};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    revoked: HashSet<String>,
    boards: Vec<Board>,
    tasks: Vec<Task>,
    subtasks: Vec<Subtask>,
}

impl Collections {
    fn owned_board(&self, owner: Uuid, board_id: Uuid) -> Option<&Board> {
        self.boards
            .iter()
            .find(|board| board.id == board_id && board.user_id == owner)
    }

    fn owns_board(&self, owner: Uuid, board_id: Uuid) -> bool {
        self.owned_board(owner, board_id).is_some()
    }

    /// Index of a task on a board owned by `owner`
    fn owned_task(&self, owner: Uuid, task_id: Uuid) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id && self.owns_board(owner, task.board_id))
    }

    /// Index of a subtask whose task sits on a board owned by `owner`
    fn owned_subtask(&self, owner: Uuid, subtask_id: Uuid) -> Option<usize> {
        self.subtasks.iter().position(|subtask| {
            subtask.id == subtask_id && self.owned_task(owner, subtask.task_id).is_some()
        })
    }
}

/// Store holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut data = self.inner.lock().await;

        if data.users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.inner.lock().await;
        Ok(data.users.iter().find(|user| user.email == email).cloned())
    }

    async fn revoke_token(&self, token: &str) -> StoreResult<bool> {
        Ok(self.inner.lock().await.revoked.insert(token.to_string()))
    }

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool> {
        Ok(self.inner.lock().await.revoked.contains(token))
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn create_board(&self, owner: Uuid, board: NewBoard) -> StoreResult<Board> {
        let now = Utc::now();
        let board = Board {
            id: Uuid::new_v4(),
            name: board.name,
            user_id: owner,
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.inner.lock().await.boards.push(board.clone());
        Ok(board)
    }

    async fn list_boards(&self, owner: Uuid) -> StoreResult<Vec<Board>> {
        let data = self.inner.lock().await;
        Ok(data
            .boards
            .iter()
            .filter(|board| board.user_id == owner)
            .cloned()
            .collect())
    }

    async fn board_detail(&self, owner: Uuid, board_id: Uuid) -> StoreResult<BoardDetail> {
        let data = self.inner.lock().await;

        let board = data
            .owned_board(owner, board_id)
            .cloned()
            .ok_or(StoreError::NotFound(Entity::Board))?;

        let tasks: Vec<Task> = data
            .tasks
            .iter()
            .filter(|task| task.board_id == board_id)
            .cloned()
            .collect();
        let task_ids: HashSet<Uuid> = tasks.iter().map(|task| task.id).collect();
        let subtasks: Vec<Subtask> = data
            .subtasks
            .iter()
            .filter(|subtask| task_ids.contains(&subtask.task_id))
            .cloned()
            .collect();

        Ok(BoardDetail::assemble(board, tasks, subtasks))
    }

    async fn update_board(
        &self,
        owner: Uuid,
        board_id: Uuid,
        changes: BoardChanges,
    ) -> StoreResult<Board> {
        let mut data = self.inner.lock().await;

        let board = data
            .boards
            .iter_mut()
            .find(|board| board.id == board_id && board.user_id == owner)
            .ok_or(StoreError::NotFound(Entity::Board))?;

        if let Some(name) = changes.name {
            board.name = name;
        }
        board.updated_at = Utc::now();
        Ok(board.clone())
    }

    async fn delete_board(&self, owner: Uuid, board_id: Uuid) -> StoreResult<BoardDeletion> {
        let mut data = self.inner.lock().await;

        let index = data
            .boards
            .iter()
            .position(|board| board.id == board_id && board.user_id == owner)
            .ok_or(StoreError::NotFound(Entity::Board))?;
        let board = data.boards.remove(index);

        let doomed: HashSet<Uuid> = data
            .tasks
            .iter()
            .filter(|task| task.board_id == board_id)
            .map(|task| task.id)
            .collect();

        let tasks_before = data.tasks.len();
        data.tasks.retain(|task| !doomed.contains(&task.id));
        let subtasks_before = data.subtasks.len();
        data.subtasks.retain(|subtask| !doomed.contains(&subtask.task_id));

        Ok(BoardDeletion {
            tasks_deleted: (tasks_before - data.tasks.len()) as u64,
            subtasks_deleted: (subtasks_before - data.subtasks.len()) as u64,
            board,
        })
    }

    async fn create_task(&self, owner: Uuid, board_id: Uuid, task: NewTask) -> StoreResult<Task> {
        let mut data = self.inner.lock().await;

        if !data.owns_board(owner, board_id) {
            return Err(StoreError::NotFound(Entity::Board));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: task.status,
            board_id,
            subtask_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Some(board) = data.boards.iter_mut().find(|board| board.id == board_id) {
            board.task_ids.push(task.id);
            board.updated_at = now;
        }
        data.tasks.push(task.clone());
        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid, board_id: Uuid) -> StoreResult<Vec<Task>> {
        let data = self.inner.lock().await;

        if !data.owns_board(owner, board_id) {
            return Ok(Vec::new());
        }

        Ok(data
            .tasks
            .iter()
            .filter(|task| task.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn update_task(
        &self,
        owner: Uuid,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Task> {
        let mut data = self.inner.lock().await;

        let index = data
            .owned_task(owner, task_id)
            .ok_or(StoreError::NotFound(Entity::Task))?;

        let task = &mut data.tasks[index];
        changes.apply_to(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, owner: Uuid, task_id: Uuid) -> StoreResult<Task> {
        let mut data = self.inner.lock().await;

        let index = data
            .owned_task(owner, task_id)
            .ok_or(StoreError::NotFound(Entity::Task))?;
        let task = data.tasks.remove(index);

        if let Some(board) = data.boards.iter_mut().find(|board| board.id == task.board_id) {
            board.task_ids.retain(|id| *id != task_id);
            board.updated_at = Utc::now();
        }
        data.subtasks.retain(|subtask| subtask.task_id != task_id);

        Ok(task)
    }

    async fn create_subtask(
        &self,
        owner: Uuid,
        task_id: Uuid,
        subtask: NewSubtask,
    ) -> StoreResult<Subtask> {
        let mut data = self.inner.lock().await;

        let index = data
            .owned_task(owner, task_id)
            .ok_or(StoreError::NotFound(Entity::Task))?;

        let now = Utc::now();
        let subtask = Subtask {
            id: Uuid::new_v4(),
            title: subtask.title,
            is_completed: subtask.is_completed,
            task_id,
            created_at: now,
            updated_at: now,
        };

        let task = &mut data.tasks[index];
        task.subtask_ids.push(subtask.id);
        task.updated_at = now;
        data.subtasks.push(subtask.clone());
        Ok(subtask)
    }

    async fn list_subtasks(&self, owner: Uuid, task_id: Uuid) -> StoreResult<Vec<Subtask>> {
        let data = self.inner.lock().await;

        if data.owned_task(owner, task_id).is_none() {
            return Ok(Vec::new());
        }

        Ok(data
            .subtasks
            .iter()
            .filter(|subtask| subtask.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn update_subtask(
        &self,
        owner: Uuid,
        subtask_id: Uuid,
        changes: SubtaskChanges,
    ) -> StoreResult<Subtask> {
        let mut data = self.inner.lock().await;

        let index = data
            .owned_subtask(owner, subtask_id)
            .ok_or(StoreError::NotFound(Entity::Subtask))?;

        let subtask = &mut data.subtasks[index];
        changes.apply_to(subtask);
        subtask.updated_at = Utc::now();
        Ok(subtask.clone())
    }

    async fn delete_subtask(&self, owner: Uuid, subtask_id: Uuid) -> StoreResult<()> {
        let mut data = self.inner.lock().await;

        let task_id = data
            .subtasks
            .iter()
            .find(|subtask| subtask.id == subtask_id)
            .map(|subtask| subtask.task_id)
            .ok_or(StoreError::NotFound(Entity::Subtask))?;

        // A foreign subtask looks exactly like a missing one. Only an orphan,
        // whose task row is gone, reports the task.
        if !data.tasks.iter().any(|task| task.id == task_id) {
            return Err(StoreError::NotFound(Entity::Task));
        }
        let task_index = data
            .owned_task(owner, task_id)
            .ok_or(StoreError::NotFound(Entity::Subtask))?;

        let task = &mut data.tasks[task_index];
        task.subtask_ids.retain(|id| *id != subtask_id);
        task.updated_at = Utc::now();
        data.subtasks.retain(|subtask| subtask.id != subtask_id);

        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
