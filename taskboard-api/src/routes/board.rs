/// Board endpoints
///
/// All handlers run behind [`require_auth`](crate::middleware::auth::require_auth)
/// and only ever see boards owned by the caller. A board id that exists but
/// belongs to someone else answers 404, same as a missing one.

use crate::{
    app::AppState,
    error::{ApiResult, ErrorResponse},
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthContext,
    routes::user::MessageResponse,
};
use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::board::{Board, BoardChanges, BoardDetail, NewBoard};
use taskboard_shared::store::GraphStore;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Partial board update; other fields in the body are ignored
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBoardRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    pub message: String,
    pub board: Board,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardsResponse {
    pub message: String,
    pub boards: Vec<Board>,
}

/// `POST /board`
#[utoipa::path(
    post,
    path = "/board",
    tag = "Board",
    security(("bearer_auth" = [])),
    request_body = CreateBoardRequest,
    responses(
        (status = 200, description = "Board created", body = BoardResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
    )
)]
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateBoardRequest>,
) -> ApiResult<ApiJson<BoardResponse>> {
    req.validate()?;

    let board = state
        .store
        .create_board(auth.user_id, NewBoard { name: req.name })
        .await?;

    tracing::info!(board_id = %board.id, user_id = %auth.user_id, "Created board");
    Ok(ApiJson(BoardResponse {
        message: "Board created successfully".to_string(),
        board,
    }))
}

/// `GET /board` - the caller's boards, task lists as ids
#[utoipa::path(
    get,
    path = "/board",
    tag = "Board",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Boards of the caller", body = BoardsResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
    )
)]
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiJson<BoardsResponse>> {
    let boards = state.store.list_boards(auth.user_id).await?;

    Ok(ApiJson(BoardsResponse {
        message: "Boards fetched successfully".to_string(),
        boards,
    }))
}

/// `GET /board/:id` - the board with its tasks and their subtasks expanded
///
/// Returns the board object itself rather than an envelope:
///
/// ```json
/// { "id": "...", "name": "Home", "userId": "...", "tasks": [] }
/// ```
#[utoipa::path(
    get,
    path = "/board/{id}",
    tag = "Board",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Board id")),
    responses(
        (status = 200, description = "Board with tasks and subtasks", body = BoardDetail),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Board not found", body = ErrorResponse),
    )
)]
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<BoardDetail>> {
    let detail = state.store.board_detail(auth.user_id, board_id).await?;
    Ok(ApiJson(detail))
}

/// `PATCH /board/:id`
#[utoipa::path(
    patch,
    path = "/board/{id}",
    tag = "Board",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Board id")),
    request_body = UpdateBoardRequest,
    responses(
        (status = 200, description = "Board updated", body = BoardResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Board not found", body = ErrorResponse),
    )
)]
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateBoardRequest>,
) -> ApiResult<ApiJson<BoardResponse>> {
    req.validate()?;

    let board = state
        .store
        .update_board(auth.user_id, board_id, BoardChanges { name: req.name })
        .await?;

    Ok(ApiJson(BoardResponse {
        message: "Board updated successfully".to_string(),
        board,
    }))
}

/// `DELETE /board/:id` - removes the board, its tasks and their subtasks
#[utoipa::path(
    delete,
    path = "/board/{id}",
    tag = "Board",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Board id")),
    responses(
        (status = 200, description = "Board, tasks and subtasks deleted", body = MessageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "Board not found", body = ErrorResponse),
    )
)]
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<MessageResponse>> {
    state.store.delete_board(auth.user_id, board_id).await?;

    Ok(ApiJson(MessageResponse {
        message: "Board and associated data deleted successfully".to_string(),
    }))
}
