//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Body text for every 500-class error
pub const SOMETHING_WENT_WRONG: &str = "Sorry. Something Went Wrong. Please, contact us!";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Not valid login data")]
    InvalidCredentials,

    #[error("You are banned")]
    AccountBanned,

    /// Missing, unknown or mismatched refresh attempt
    #[error("Your refresh token is invalid")]
    InvalidRefreshToken,

    #[error("Not found")]
    NotFound,

    /// Missing, malformed or expired access token
    #[error("Not authenticated")]
    Unauthorized,

    /// Role check failed
    #[error("Access denied")]
    AccessDenied,

    /// A session found by lookup was gone at delete time
    #[error("Session vanished between lookup and delete")]
    RevocationInconsistency,

    #[error("The user with this email already exists in the system.")]
    EmailTaken,

    #[error("You don't have privileges to do this")]
    InsufficientPrivileges,

    /// Request body failed validation
    #[error("{0}")]
    InvalidInput(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidInput(_)
            | AuthError::EmailTaken
            | AuthError::InsufficientPrivileges => ErrorKind::BadRequest,
            AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::AccountBanned
            | AuthError::InvalidRefreshToken
            | AuthError::AccessDenied => ErrorKind::Forbidden,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::RevocationInconsistency
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_data",
            AuthError::InvalidInput(_) => "invalid_input",
            AuthError::EmailTaken => "same_user_email",
            AuthError::InsufficientPrivileges => "not_enough_privileges",
            AuthError::Unauthorized => "unauthorized",
            AuthError::AccountBanned => "user_is_banned",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::AccessDenied => "access_denied",
            AuthError::NotFound => "not_found",
            AuthError::RevocationInconsistency
            | AuthError::Database(_)
            | AuthError::Internal(_) => "something_went_wrong",
        }
    }

    /// Convert to AppError
    ///
    /// Server errors carry a fixed message so internals never reach the caller.
    pub fn to_app_error(&self) -> AppError {
        let app_error = match self.kind() {
            ErrorKind::BadRequest => AppError::bad_request(self.to_string()),
            ErrorKind::Unauthorized => AppError::unauthorized(self.to_string()),
            ErrorKind::Forbidden => AppError::forbidden(self.to_string()),
            ErrorKind::NotFound => AppError::not_found(self.to_string()),
            _ => AppError::internal(SOMETHING_WENT_WRONG),
        };
        app_error.with_code(self.code())
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
            AuthError::RevocationInconsistency => {
                tracing::error!("Session delete affected no row during revocation");
            }
            _ => {
                tracing::debug!(code = self.code(), error = %self, "Auth error");
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

/// Value-object validation errors are client errors; anything else is internal
impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.kind().is_client_error() {
            AuthError::InvalidInput(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}
