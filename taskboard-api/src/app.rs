/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::auth::require_auth, routes};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskboard_shared::{
    auth::authenticator::{AuthError, Authenticator},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Credential and token checks
    pub auth: Arc<Authenticator>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates the state, building the authenticator from `config`
    pub fn new(store: Arc<dyn Store>, config: Config) -> Result<Self, AuthError> {
        let auth = Authenticator::new(
            config.jwt.secret.clone(),
            (&config.password).into(),
            Duration::minutes(config.jwt.access_ttl_minutes),
            Duration::days(config.jwt.refresh_ttl_days),
        )?;

        Ok(Self {
            store,
            auth: Arc::new(auth),
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /                      # Liveness text (public)
/// ├── GET /health                # Health check (public)
/// ├── GET /api-docs              # OpenAPI document (public)
/// ├── /user/
/// │   ├── POST /register
/// │   ├── POST /login
/// │   ├── GET  /logout           # checks its own token
/// │   └── POST /refresh
/// ├── /board                     # bearer token required
/// │   ├── POST, GET /
/// │   └── GET, PATCH, DELETE /:id
/// ├── /task/:id                  # POST, GET by board id; PATCH, DELETE by task id
/// └── /subtask/:id               # POST, GET by task id; PATCH, DELETE by subtask id
/// ```
///
/// # Middleware Stack
///
/// Outermost first: CORS, timeout body rewrite, request timeout, tracing,
/// then authentication on the protected routes.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/register", post(routes::user::register))
        .route("/login", post(routes::user::login))
        .route("/logout", get(routes::user::logout))
        .route("/refresh", post(routes::user::refresh));

    // `:id` is the parent id for POST/GET and the resource id for PATCH/DELETE
    let protected_routes = Router::new()
        .route(
            "/board",
            post(routes::board::create_board).get(routes::board::list_boards),
        )
        .route(
            "/board/:id",
            get(routes::board::get_board)
                .patch(routes::board::update_board)
                .delete(routes::board::delete_board),
        )
        .route(
            "/task/:id",
            post(routes::task::create_task)
                .get(routes::task::list_tasks)
                .patch(routes::task::update_task)
                .delete(routes::task::delete_task),
        )
        .route(
            "/subtask/:id",
            post(routes::subtask::create_subtask)
                .get(routes::subtask::list_subtasks)
                .patch(routes::subtask::update_subtask)
                .delete(routes::subtask::delete_subtask),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let cors = if state.config.cors_allows_any() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let timeout = std::time::Duration::from_secs(state.config.api.request_timeout_secs);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/api-docs", get(routes::docs::api_docs))
        .nest("/user", user_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::map_response(timeout_body))
        .layer(cors)
        .with_state(state)
}

/// Gives the bare 408 from `TimeoutLayer` the same JSON body as every other error
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::RequestTimeout("Request timed out".to_string()).into_response();
    }
    response
}
