/// Task endpoints
///
/// The `:id` segment is the board id for `POST` and `GET`, and the task id
/// for `PATCH` and `DELETE`.
///
/// # Endpoints
///
/// - `POST /task/:boardId` - Create a task and link it into the board
/// - `GET /task/:boardId` - List the board's tasks (empty for unknown boards)
/// - `PATCH /task/:taskId` - Partial update
/// - `DELETE /task/:taskId` - Delete the task and its subtasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ErrorResponse},
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthContext,
};
use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::double_option;
use taskboard_shared::models::task::{NewTask, Task, TaskChanges};
use taskboard_shared::store::GraphStore;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Create task request
///
/// A `subtaskId` field is accepted and ignored; subtasks link themselves
/// into their task when they are created.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Status must be 1-100 characters"))]
    pub status: String,
}

/// Partial task update
///
/// Absent fields are left alone. `"description": null` clears the
/// description; an empty string is stored as given.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[validate(length(max = 100, message = "Status must be at most 100 characters"))]
    pub status: Option<String>,
}

impl UpdateTaskRequest {
    fn into_changes(self) -> ApiResult<TaskChanges> {
        if let Some(Some(description)) = &self.description {
            if description.chars().count() > 5000 {
                return Err(ApiError::BadRequest(
                    "Description must be at most 5000 characters".to_string(),
                ));
            }
        }

        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            status: self.status,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub message: String,
    pub task: Task,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TasksResponse {
    pub message: String,
    pub tasks: Vec<Task>,
}

/// `POST /task/:boardId`
///
/// # Errors
///
/// - `404 Not Found`: Board missing or owned by someone else
#[utoipa::path(
    post,
    path = "/task/{id}",
    tag = "Task",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Board id")),
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Board not found", body = ErrorResponse),
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<ApiJson<TaskResponse>> {
    req.validate()?;

    let task = state
        .store
        .create_task(
            auth.user_id,
            board_id,
            NewTask {
                title: req.title,
                description: req.description,
                status: req.status,
            },
        )
        .await?;

    tracing::info!(task_id = %task.id, board_id = %board_id, "Created task");
    Ok(ApiJson(TaskResponse {
        message: "Task created successfully".to_string(),
        task,
    }))
}

/// `GET /task/:boardId`
#[utoipa::path(
    get,
    path = "/task/{id}",
    tag = "Task",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Board id")),
    responses(
        (status = 200, description = "Tasks of the board", body = TasksResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<TasksResponse>> {
    let tasks = state.store.list_tasks(auth.user_id, board_id).await?;

    Ok(ApiJson(TasksResponse {
        message: "Tasks fetched successfully".to_string(),
        tasks,
    }))
}

/// `PATCH /task/:taskId`
#[utoipa::path(
    patch,
    path = "/task/{id}",
    tag = "Task",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<ApiJson<TaskResponse>> {
    req.validate()?;

    let task = state
        .store
        .update_task(auth.user_id, task_id, req.into_changes()?)
        .await?;

    Ok(ApiJson(TaskResponse {
        message: "Task updated successfully".to_string(),
        task,
    }))
}

/// `DELETE /task/:taskId` - answers with the deleted task
#[utoipa::path(
    delete,
    path = "/task/{id}",
    tag = "Task",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task and its subtasks deleted", body = TaskResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<TaskResponse>> {
    let task = state.store.delete_task(auth.user_id, task_id).await?;

    tracing::info!(task_id = %task_id, "Deleted task");
    Ok(ApiJson(TaskResponse {
        message: "Task deleted successfully".to_string(),
        task,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdateTaskRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let changes = cleared.into_changes().unwrap();
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_create_request_ignores_subtask_id() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title":"t","status":"Todo","subtaskId":"abc"}"#,
        )
        .unwrap();
        assert_eq!(req.title, "t");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_description_rejected() {
        let req = UpdateTaskRequest {
            description: Some(Some("x".repeat(5001))),
            ..Default::default()
        };
        assert!(req.into_changes().is_err());
    }
}
