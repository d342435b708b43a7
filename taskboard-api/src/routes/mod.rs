/// API route handlers
///
/// Organized by resource:
///
/// - `health`: `/` and `/health`
/// - `user`: register, login, logout and token refresh
/// - `board`, `task`, `subtask`: the owner-scoped resource graph
/// - `docs`: the OpenAPI document served at `/api-docs`

pub mod board;
pub mod docs;
pub mod health;
pub mod subtask;
pub mod task;
pub mod user;
