/// Credential checks and token lifecycle
///
/// [`Authenticator`] ties password hashing, JWT signing and the revoked-token
/// list together. It holds no storage itself; every method takes the
/// [`CredentialStore`] to use, so the same authenticator works against
/// PostgreSQL and the in-memory store.
///
/// # Token rules
///
/// - Access tokens authorize requests; refresh tokens only buy a new pair.
/// - A revoked token is rejected even while its signature and expiry are
///   still valid.
/// - Refresh tokens are single use: refreshing revokes the presented token.

use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::jwt::{
    create_token, validate_access_token, validate_refresh_token, Claims, JwtError, TokenType,
};
use super::password::{hash_password, verify_password, PasswordError, PasswordParams};
use crate::models::user::{NewUser, User};
use crate::store::{CredentialStore, StoreError};

/// Minimum accepted signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Error type for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was presented
    #[error("Missing bearer token")]
    MissingToken,

    /// Token is malformed, badly signed, expired or of the wrong type
    #[error("Invalid token: {0}")]
    InvalidToken(#[source] JwtError),

    /// Token was revoked by logout or refresh
    #[error("Token has been revoked")]
    RevokedToken,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration with an email that already exists
    #[error("Email is already registered")]
    EmailTaken,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),

    /// Misconfiguration or a failed background task
    #[error("Authentication failure: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Store(other),
        }
    }
}

/// Freshly issued token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and checks credentials
pub struct Authenticator {
    secret: String,
    params: PasswordParams,
    access_ttl: Duration,
    refresh_ttl: Duration,

    /// Verified against when the email is unknown, so both login failures
    /// cost one Argon2 verification
    dummy_hash: String,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("params", &self.params)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Creates an authenticator
    ///
    /// # Errors
    ///
    /// Fails if the secret is shorter than [`MIN_SECRET_LEN`] or the password
    /// parameters are rejected by Argon2.
    pub fn new(
        secret: impl Into<String>,
        params: PasswordParams,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Internal(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let dummy_hash = hash_password(&Uuid::new_v4().to_string(), &params)?;

        Ok(Self {
            secret,
            params,
            access_ttl,
            refresh_ttl,
            dummy_hash,
        })
    }

    /// Creates a user with a hashed password. Issues no token.
    pub async fn register<S>(
        &self,
        store: &S,
        name: String,
        email: String,
        password: String,
    ) -> Result<User, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let params = self.params;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, &params))
                .await
                .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))??;

        let user = store
            .create_user(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Checks the credentials and issues a token pair
    pub async fn login<S>(
        &self,
        store: &S,
        email: &str,
        password: &str,
    ) -> Result<(User, TokenPair), AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let user = store.find_user_by_email(email).await?;

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))??;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                warn!("Rejected login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let pair = self.issue_pair(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, pair))
    }

    /// Validates an access token and returns the user id it carries
    pub async fn authorize<S>(
        &self,
        store: &S,
        token: &str,
    ) -> Result<Uuid, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let claims = validate_access_token(token, &self.secret).map_err(AuthError::InvalidToken)?;

        if store.is_token_revoked(token).await? {
            debug!(user_id = %claims.user_id, "Rejected revoked token");
            return Err(AuthError::RevokedToken);
        }

        Ok(claims.user_id)
    }

    /// Revokes an access token after checking it is currently valid
    pub async fn logout<S>(
        &self,
        store: &S,
        token: Option<&str>,
    ) -> Result<Uuid, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let token = token.ok_or(AuthError::MissingToken)?;
        let user_id = self.authorize(store, token).await?;

        store.revoke_token(token).await?;

        info!(user_id = %user_id, "User logged out");
        Ok(user_id)
    }

    /// Exchanges a refresh token for a new pair, revoking the old token.
    /// Each refresh token is redeemed at most once.
    pub async fn refresh<S>(
        &self,
        store: &S,
        refresh_token: &str,
    ) -> Result<TokenPair, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let claims =
            validate_refresh_token(refresh_token, &self.secret).map_err(AuthError::InvalidToken)?;

        // Revoking is the redemption: of several concurrent calls with the
        // same token only the one whose insert lands gets a new pair.
        if !store.revoke_token(refresh_token).await? {
            warn!(user_id = %claims.user_id, "Refresh token reused");
            return Err(AuthError::RevokedToken);
        }

        let pair = self.issue_pair(claims.user_id)?;

        debug!(user_id = %claims.user_id, "Rotated refresh token");
        Ok(pair)
    }

    fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let access = Claims::new(user_id, TokenType::Access, self.access_ttl);
        let refresh = Claims::new(user_id, TokenType::Refresh, self.refresh_ttl);

        Ok(TokenPair {
            token: create_token(&access, &self.secret).map_err(AuthError::InvalidToken)?,
            refresh_token: create_token(&refresh, &self.secret).map_err(AuthError::InvalidToken)?,
        })
    }
}
