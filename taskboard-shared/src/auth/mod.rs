/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`authenticator`]: register, login, authorize, logout and refresh on
///   top of a [`CredentialStore`](crate::store::CredentialStore)
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password, PasswordParams};
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", &PasswordParams::default())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access, Duration::hours(24));
/// let token = create_token(&claims, "secret-key-of-at-least-32-bytes!")?;
/// assert!(validate_token(&token, "secret-key-of-at-least-32-bytes!").is_ok());
/// # Ok(())
/// # }
/// ```

pub mod authenticator;
pub mod jwt;
pub mod password;
