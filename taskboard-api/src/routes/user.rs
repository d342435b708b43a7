/// User account endpoints
///
/// # Endpoints
///
/// - `POST /user/register` - Register new user
/// - `POST /user/login` - Login and get a token pair
/// - `GET /user/logout` - Revoke the presented bearer token
/// - `POST /user/refresh` - Exchange a refresh token for a new pair

use crate::{
    app::AppState,
    error::{ApiResult, ErrorResponse},
    extract::ApiJson,
    middleware::auth::bearer_token,
};
use axum::{extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Token pair response, shared by login and refresh
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub message: String,

    /// Access token
    pub token: String,

    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
///
/// ```text
/// POST /user/register
/// { "name": "Ada", "email": "ada@example.com", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already registered
#[utoipa::path(
    post,
    path = "/user/register",
    tag = "User",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input or email taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<ApiJson<RegisterResponse>> {
    req.validate()?;

    let user = state
        .auth
        .register(state.store.as_ref(), req.name, req.email, req.password)
        .await?;

    Ok(ApiJson(RegisterResponse {
        message: "New user registered successfully".to_string(),
        user_id: user.id,
    }))
}

/// Login with email and password
///
/// ```text
/// POST /user/login
/// { "email": "ada@example.com", "password": "..." }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "login successful", "token": "eyJ...", "refreshToken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email or wrong password (same message for both)
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "User",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<ApiJson<TokenResponse>> {
    req.validate()?;

    let (_, pair) = state
        .auth
        .login(state.store.as_ref(), &req.email, &req.password)
        .await?;

    Ok(ApiJson(TokenResponse {
        message: "login successful".to_string(),
        token: pair.token,
        refresh_token: pair.refresh_token,
    }))
}

/// Revoke the bearer token of this request
///
/// # Errors
///
/// - `400 Bad Request`: No bearer token
/// - `401 Unauthorized`: Token invalid or already revoked
#[utoipa::path(
    get,
    path = "/user/logout",
    tag = "User",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 400, description = "No token provided", body = ErrorResponse),
        (status = 401, description = "Invalid or revoked token", body = ErrorResponse),
    )
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<ApiJson<MessageResponse>> {
    state
        .auth
        .logout(state.store.as_ref(), bearer_token(&headers))
        .await?;

    Ok(ApiJson(MessageResponse {
        message: "logout successful".to_string(),
    }))
}

/// Exchange a refresh token for a new token pair
///
/// The presented refresh token is revoked; reusing it answers 401.
#[utoipa::path(
    post,
    path = "/user/refresh",
    tag = "User",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Invalid, revoked or reused refresh token", body = ErrorResponse),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<ApiJson<TokenResponse>> {
    let pair = state
        .auth
        .refresh(state.store.as_ref(), &req.refresh_token)
        .await?;

    Ok(ApiJson(TokenResponse {
        message: "token refreshed".to_string(),
        token: pair.token,
        refresh_token: pair.refresh_token,
    }))
}
