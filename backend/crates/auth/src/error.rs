//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. The `#[error]` text of client-facing
//! variants is exactly the `error` field of the response body.

use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordPolicyError;
use thiserror::Error;

use crate::application::token::TokenRejection;
use crate::domain::value_object::{user_name::UserNameError, user_role::UserRoleError};

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password; the two are never distinguished
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password was right but the account needs a one-time code
    #[error("second factor required")]
    SecondFactorRequired,

    #[error("invalid second factor")]
    InvalidSecondFactor,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("missing token")]
    MissingToken,

    /// The specific reason is logged, never returned
    #[error("invalid token")]
    InvalidToken(TokenRejection),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid enrollment code")]
    InvalidEnrollmentCode,

    #[error("second factor already enabled")]
    SecondFactorAlreadyEnabled,

    #[error("second factor not enabled")]
    SecondFactorNotEnabled,

    #[error("{0}")]
    Validation(String),

    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    #[error("account not found")]
    AccountNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken(_) => ErrorKind::Unauthorized,
            AuthError::SecondFactorRequired
            | AuthError::InvalidSecondFactor
            | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::DuplicateUsername
            | AuthError::InvalidEnrollmentCode
            | AuthError::SecondFactorAlreadyEnabled
            | AuthError::SecondFactorNotEnabled
            | AuthError::Validation(_)
            | AuthError::UnknownGroup(_) => ErrorKind::BadRequest,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_),
            ) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Convert to AppError. Server-side detail never reaches the message.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => {
                let app_error = AppError::from(e);
                if app_error.kind() == ErrorKind::InternalServerError {
                    app_error.with_message("internal server error")
                } else {
                    app_error
                }
            }
            AuthError::Internal(_) => AppError::internal("internal server error"),
            other => AppError::new(other.kind(), other.to_string()),
        }
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
            AuthError::InvalidSecondFactor => {
                tracing::warn!("Rejected second factor code");
            }
            AuthError::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
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
        self.into_app_error().into_response()
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<UserRoleError> for AuthError {
    fn from(err: UserRoleError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}
