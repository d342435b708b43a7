/// OpenAPI document
///
/// Served as JSON at `GET /api-docs`. The document is assembled at compile
/// time from the `#[utoipa::path]` attributes on the handlers.

use crate::{
    error::{ErrorResponse, ValidationErrorDetail},
    routes::{board, health, subtask, task, user},
};
use axum::Json;
use taskboard_shared::models::{
    board::{Board, BoardDetail},
    subtask::Subtask,
    task::{Task, TaskDetail},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskboard API",
        description = "Boards, tasks and subtasks behind JWT authentication"
    ),
    paths(
        health::root,
        health::health_check,
        user::register,
        user::login,
        user::logout,
        user::refresh,
        board::create_board,
        board::list_boards,
        board::get_board,
        board::update_board,
        board::delete_board,
        task::create_task,
        task::list_tasks,
        task::update_task,
        task::delete_task,
        subtask::create_subtask,
        subtask::list_subtasks,
        subtask::update_subtask,
        subtask::delete_subtask,
    ),
    components(schemas(
        ErrorResponse,
        ValidationErrorDetail,
        health::HealthResponse,
        user::RegisterRequest,
        user::RegisterResponse,
        user::LoginRequest,
        user::RefreshRequest,
        user::TokenResponse,
        user::MessageResponse,
        board::CreateBoardRequest,
        board::UpdateBoardRequest,
        board::BoardResponse,
        board::BoardsResponse,
        task::CreateTaskRequest,
        task::UpdateTaskRequest,
        task::TaskResponse,
        task::TasksResponse,
        subtask::CreateSubtaskRequest,
        subtask::UpdateSubtaskRequest,
        subtask::SubtaskResponse,
        subtask::SubtasksResponse,
        Board,
        BoardDetail,
        Task,
        TaskDetail,
        Subtask,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and storage status"),
        (name = "User", description = "Registration, login and token lifecycle"),
        (name = "Board", description = "Boards owned by the caller"),
        (name = "Task", description = "Tasks inside a board"),
        (name = "Subtask", description = "Checklist items inside a task"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// `GET /api-docs`
pub async fn api_docs() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/user/register",
            "/user/login",
            "/user/logout",
            "/user/refresh",
            "/board",
            "/board/{id}",
            "/task/{id}",
            "/subtask/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("BoardDetail"));
    }
}
