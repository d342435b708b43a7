/// Common test utilities for integration tests
///
/// Every test gets its own router backed by a fresh
/// [`MemoryStore`](taskboard_shared::store::memory::MemoryStore), so tests
/// run without a database and never share state. Password hashing uses cheap
/// Argon2 parameters.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{
    ApiConfig, Config, DatabaseConfig, JwtConfig, LogFormat, PasswordHashConfig,
};
use taskboard_shared::store::memory::MemoryStore;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery staple";

/// Test context holding the router under test
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

/// A registered and logged-in user
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret-at-least-32-bytes".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 1,
        },
        password: PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        log_format: LogFormat::Pretty,
    }
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let state = AppState::new(Arc::new(MemoryStore::new()), config.clone())
            .expect("valid test config");

        TestContext {
            app: build_router(state),
            config,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty or non-JSON bodies)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Sends a raw request and returns the status with the body as text
    pub async fn send_text(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Registers `email` and logs in
    pub async fn user(&self, email: &str) -> TestUser {
        let (status, body) = self
            .send(
                "POST",
                "/user/register",
                None,
                Some(serde_json::json!({
                    "name": "Test User",
                    "email": email,
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        let id = body["userId"].as_str().unwrap().to_string();

        let (status, body) = self
            .send(
                "POST",
                "/user/login",
                None,
                Some(serde_json::json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        TestUser {
            id,
            email: email.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            refresh_token: body["refreshToken"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a board and returns its id
    pub async fn board(&self, user: &TestUser, name: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/board",
                Some(&user.token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create board failed: {}", body);
        body["board"]["id"].as_str().unwrap().to_string()
    }

    /// Creates a task on `board_id` and returns its id
    pub async fn task(&self, user: &TestUser, board_id: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                &format!("/task/{}", board_id),
                Some(&user.token),
                Some(serde_json::json!({ "title": title, "status": "Todo" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
        body["task"]["id"].as_str().unwrap().to_string()
    }

    /// Creates a subtask on `task_id` and returns its id
    pub async fn subtask(&self, user: &TestUser, task_id: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                &format!("/subtask/{}", task_id),
                Some(&user.token),
                Some(serde_json::json!({ "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create subtask failed: {}", body);
        body["subtask"]["id"].as_str().unwrap().to_string()
    }
}
