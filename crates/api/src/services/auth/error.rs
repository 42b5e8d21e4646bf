//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] veriquick_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Account has been deactivated.
    #[error("account is deactivated")]
    AccountDeactivated,

    /// OTP code wrong, expired, or already consumed.
    #[error("invalid or expired verification code")]
    InvalidOtp,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// HTTP status to respond with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::UserNotFound | Self::AccountDeactivated => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::WeakPassword(_) | Self::InvalidEmail(_) | Self::InvalidOtp => {
                StatusCode::BAD_REQUEST
            }
            Self::Repository(_) | Self::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidCredentials | Self::UserNotFound => "Invalid credentials".to_string(),
            Self::UserAlreadyExists => "An account with this email already exists".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::AccountDeactivated => "Account is deactivated".to_string(),
            Self::InvalidOtp => "Invalid or expired verification code".to_string(),
            Self::Repository(_) | Self::PasswordHash => "Authentication error".to_string(),
        }
    }
}
