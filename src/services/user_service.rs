use sqlx::PgPool;
use thiserror::Error;

use crate::auth::{self, Claims, JwtError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already exists")]
    EmailTaken,

    /// Covers both unknown email and wrong password; the caller cannot tell
    /// which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, AuthError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create a new account. Email uniqueness is checked up front so a
    /// duplicate surfaces as a conflict rather than a constraint violation.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = auth::hash_password(password)?;

        let user: User = sqlx::query_as(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let user = user.ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = auth::generate_jwt(Claims::new(user.id, user.email))?;
        Ok(token)
    }
}
