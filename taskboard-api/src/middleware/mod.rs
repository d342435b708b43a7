/// Middleware modules for the API server
///
/// - `auth`: bearer token authentication for the board, task and subtask routes

pub mod auth;
