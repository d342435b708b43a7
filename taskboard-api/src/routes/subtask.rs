/// Subtask endpoints
///
/// The `:id` segment is the task id for `POST` and `GET`, and the subtask id
/// for `PATCH` and `DELETE`.

use crate::{
    app::AppState,
    error::{ApiResult, ErrorResponse},
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthContext,
    routes::user::MessageResponse,
};
use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::subtask::{NewSubtask, Subtask, SubtaskChanges};
use taskboard_shared::store::GraphStore;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Create subtask request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubtaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub is_completed: bool,
}

/// Partial subtask update; `"isCompleted": false` is applied
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubtaskRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub is_completed: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubtaskResponse {
    pub message: String,
    pub subtask: Subtask,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubtasksResponse {
    pub message: String,
    pub subtasks: Vec<Subtask>,
}

/// `POST /subtask/:taskId`
#[utoipa::path(
    post,
    path = "/subtask/{id}",
    tag = "Subtask",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = CreateSubtaskRequest,
    responses(
        (status = 200, description = "Subtask created", body = SubtaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn create_subtask(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateSubtaskRequest>,
) -> ApiResult<ApiJson<SubtaskResponse>> {
    req.validate()?;

    let subtask = state
        .store
        .create_subtask(
            auth.user_id,
            task_id,
            NewSubtask {
                title: req.title,
                is_completed: req.is_completed,
            },
        )
        .await?;

    Ok(ApiJson(SubtaskResponse {
        message: "Subtask created successfully".to_string(),
        subtask,
    }))
}

/// `GET /subtask/:taskId`
#[utoipa::path(
    get,
    path = "/subtask/{id}",
    tag = "Subtask",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Subtasks of the task", body = SubtasksResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
    )
)]
pub async fn list_subtasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<SubtasksResponse>> {
    let subtasks = state.store.list_subtasks(auth.user_id, task_id).await?;

    Ok(ApiJson(SubtasksResponse {
        message: "Subtasks fetched successfully".to_string(),
        subtasks,
    }))
}

/// `PATCH /subtask/:subtaskId`
#[utoipa::path(
    patch,
    path = "/subtask/{id}",
    tag = "Subtask",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subtask id")),
    request_body = UpdateSubtaskRequest,
    responses(
        (status = 200, description = "Subtask updated", body = SubtaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Subtask not found", body = ErrorResponse),
    )
)]
pub async fn update_subtask(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(subtask_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateSubtaskRequest>,
) -> ApiResult<ApiJson<SubtaskResponse>> {
    req.validate()?;

    let subtask = state
        .store
        .update_subtask(
            auth.user_id,
            subtask_id,
            SubtaskChanges {
                title: req.title,
                is_completed: req.is_completed,
            },
        )
        .await?;

    Ok(ApiJson(SubtaskResponse {
        message: "Subtask updated successfully".to_string(),
        subtask,
    }))
}

/// `DELETE /subtask/:subtaskId`
///
/// # Errors
///
/// - `404 Not Found`: Subtask missing, or its task is gone or not owned
#[utoipa::path(
    delete,
    path = "/subtask/{id}",
    tag = "Subtask",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subtask id")),
    responses(
        (status = 200, description = "Subtask deleted", body = MessageResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Subtask or its task not found", body = ErrorResponse),
    )
)]
pub async fn delete_subtask(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(subtask_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<MessageResponse>> {
    state.store.delete_subtask(auth.user_id, subtask_id).await?;

    Ok(ApiJson(MessageResponse {
        message: "Subtask deleted successfully".to_string(),
    }))
}
