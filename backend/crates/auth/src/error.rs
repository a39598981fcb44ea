//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Every error is terminal for the current request; nothing here is
//! retried internally. `RefreshTokenRevoked` is special: by the time it
//! is returned the stored refresh token has already been cleared.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No user record for the given email or token subject
    #[error("User not found")]
    UserNotFound,

    /// Signup with an email that already has an account
    #[error("Account already exists")]
    EmailTaken,

    /// Wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login attempt before the email was confirmed
    #[error("Email not confirmed")]
    AccountNotConfirmed,

    /// Token past its expiry
    #[error("Token has expired")]
    TokenExpired,

    /// Token malformed or signature mismatch
    #[error("Token is invalid")]
    TokenInvalid,

    /// Token presented for an operation it was not issued for
    #[error("Token purpose mismatch")]
    TokenPurposeMismatch,

    /// Presented refresh token does not match the stored one; the stored
    /// token has been cleared and the user must log in again
    #[error("Refresh token has been revoked")]
    RefreshTokenRevoked,

    /// Email confirmation token could not be tied to an account
    #[error("Verification error")]
    VerificationError,

    /// Request input failed validation (bad email format, weak password)
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::AccountNotConfirmed
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenPurposeMismatch
            | AuthError::RefreshTokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::VerificationError | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::AccountNotConfirmed
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenPurposeMismatch
            | AuthError::RefreshTokenRevoked => ErrorKind::Unauthorized,
            AuthError::VerificationError | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RefreshTokenRevoked => {
                tracing::warn!("Stale refresh token presented, session revoked");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            AuthError::Validation(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
            TokenError::PurposeMismatch { .. } => AuthError::TokenPurposeMismatch,
            TokenError::Signing => AuthError::Internal("Token signing failed".to_string()),
        }
    }
}
