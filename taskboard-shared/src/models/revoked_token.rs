/// Revoked bearer tokens
///
/// Logging out stores the raw token string here. Rows are append-only: the
/// table is never swept, and a token found here is rejected even when its
/// signature and expiry are valid.
///
/// ```sql
/// CREATE TABLE revoked_tokens (
///     token TEXT PRIMARY KEY,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RevokedToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Records a token as revoked. Revoking twice is a no-op.
    ///
    /// Returns `true` when this call inserted the row. The primary key makes
    /// this exact under concurrency: of two racing inserts one returns `false`.
    pub async fn insert<'e, E>(executor: E, token: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token)
            VALUES ($1)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Whether the token has been revoked
    pub async fn exists<'e, E>(executor: E, token: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token = $1)")
            .bind(token)
            .fetch_one(executor)
            .await
    }
}
