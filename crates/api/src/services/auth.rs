//! Authentication service: registration, login and bearer-token resolution.

use std::sync::Arc;

use domain::models::{LoginRequest, RegisterRequest, Role, User};
use persistence::repositories::{UniqueField, UserRepository};
use serde::Serialize;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_policy, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;

use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is banned")]
    AccountBanned,

    #[error("Account no longer exists")]
    AccountMissing,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken | AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::AccountMissing => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::AccountBanned => ApiError::Forbidden(err.to_string()),
            AuthError::Token(e) => ApiError::from(e),
            AuthError::Password(e) => ApiError::from(e),
            AuthError::Database(e) => ApiError::from(e),
        }
    }
}

impl From<UniqueField> for AuthError {
    fn from(field: UniqueField) -> Self {
        match field {
            UniqueField::Username => AuthError::UsernameTaken,
            UniqueField::Email => AuthError::EmailTaken,
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub user: User,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Creates a regular account and signs it in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResult, AuthError> {
        check_policy(&request.password)?;

        let username = request.username.trim();
        let email = request.email.trim().to_lowercase();
        if let Some(field) = self
            .users
            .find_conflict(Some(username), Some(&email), None)
            .await?
        {
            return Err(field.into());
        }

        let password_hash = hash_password(&request.password)?;
        let user: User = self
            .users
            .create(username, &email, &password_hash, Role::User.as_str())
            .await?
            .into();

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        self.issue(user)
    }

    /// Verifies credentials. `username` may also be the account email.
    ///
    /// Unknown accounts and wrong passwords get the same error. Banned
    /// accounts are reported only after the password matched.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResult, AuthError> {
        let Some(entity) = self.users.find_by_login(request.username.trim()).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let user: User = entity.into();

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountBanned);
        }

        self.users.update_last_login(user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");
        self.issue(user)
    }

    /// Resolves a bearer token to a live, active account.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.jwt.validate(token)?;
        let user_id = claims.user_id()?;

        let user: User = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::AccountMissing)?
            .into();

        if !user.is_active {
            return Err(AuthError::AccountBanned);
        }
        Ok(user)
    }

    fn issue(&self, user: User) -> Result<AuthResult, AuthError> {
        let issued = self
            .jwt
            .issue(user.id, &user.username, user.role.as_str())?;
        Ok(AuthResult {
            user,
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
        })
    }
}
