//! Authentication: registration, login and bearer-token handling.
//!
//! Tokens are HS256 JWTs carrying the caller's id, username and role. The
//! HTTP edge verifies a token once per request and hands the resulting
//! [`AuthenticatedIdentity`] to the core services by parameter; nothing
//! downstream re-reads ambient request state.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AuthConfig, SecurityConfig};
use crate::db::{NewUser, Store, User};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The verified caller, injected into every protected operation.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub id: i32,
    pub username: String,
    pub role: String,
}

impl AuthenticatedIdentity {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: String,
    username: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed, time-limited bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = if config.jwt_secret.is_empty() {
            // Ephemeral secret: fine for a single process, but tokens stop
            // verifying across restarts. Set auth.jwt_secret in production.
            tracing::warn!("No JWT secret configured; generating an ephemeral one");
            generate_secret()
        } else {
            config.jwt_secret.clone()
        };

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes: config.token_ttl_minutes,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now,
            exp: now + self.ttl_minutes * 60,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to create token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        let id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedIdentity {
            id,
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}

/// Random 64-char hex secret
fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Outcome of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub display_name: String,
}

/// Registration and login over the credential store.
pub struct AuthService {
    store: Store,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Register a new user. Every field is required; the username and the
    /// email must both be unused. The role always starts as `user`.
    pub async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        if new_user.username.trim().is_empty()
            || new_user.email.trim().is_empty()
            || new_user.password.is_empty()
            || new_user.display_name.trim().is_empty()
            || new_user.bio.is_empty()
        {
            return Err(AuthError::Validation("Please fill all fields".to_string()));
        }

        if new_user.password.len() < self.security.password_min_length {
            return Err(AuthError::Validation(format!(
                "Password must have at least {} characters",
                self.security.password_min_length
            )));
        }

        if self
            .store
            .username_or_email_taken(&new_user.username, &new_user.email)
            .await?
        {
            return Err(AuthError::Conflict(
                "Email or username already in use".to_string(),
            ));
        }

        let user = self.store.create_user(new_user, &self.security).await?;

        tracing::info!("User {} registered", user.username);
        Ok(user)
    }

    /// Verify credentials and issue a bearer token. A missing user and a
    /// wrong password both surface as the same error.
    pub async fn login(
        &self,
        tokens: &TokenService,
        username: &str,
        password: &str,
    ) -> Result<LoginResult, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Please fill all fields".to_string()));
        }

        let user = self
            .store
            .verify_credentials(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = tokens.issue(&user)?;

        Ok(LoginResult {
            token,
            user: PublicUser {
                id: user.id,
                username: user.username,
                display_name: user.display_name,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 7,
            username: "mika".to_string(),
            email: "mika@example.com".to_string(),
            display_name: "Mika".to_string(),
            bio: "".to_string(),
            role: "user".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_minutes: 60,
        };
        let tokens = TokenService::new(&config);

        let token = tokens.issue(&test_user()).unwrap();
        let identity = tokens.verify(&token).unwrap();

        assert_eq!(identity.id, 7);
        assert_eq!(identity.username, "mika");
        assert_eq!(identity.role, "user");
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_verify_rejects_garbage_and_foreign_tokens() {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_minutes: 60,
        };
        let tokens = TokenService::new(&config);

        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));

        let other = TokenService::new(&AuthConfig {
            jwt_secret: "different-secret".to_string(),
            token_ttl_minutes: 60,
        });
        let foreign = other.issue(&test_user()).unwrap();
        assert!(matches!(
            tokens.verify(&foreign),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_minutes: -10,
        };
        let tokens = TokenService::new(&config);

        let token = tokens.issue(&test_user()).unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
