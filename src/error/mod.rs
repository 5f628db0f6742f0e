//! Application error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;

/// 500 message for failures inside `POST /auth/register`.
pub const REGISTER_FAILED: &str = "Error registering user";
/// 500 message for failures inside `POST /auth/login`.
pub const LOGIN_FAILED: &str = "Error logging in";

/// Application-level errors. The display string is the exact `message` sent to clients.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("username and password required")]
    MissingCredentials,

    #[error("username taken")]
    UsernameTaken,

    /// Unknown username and wrong password both land here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token required")]
    TokenRequired,

    #[error("token invalid")]
    TokenInvalid,

    #[error("{message}: {error}")]
    Internal {
        message: &'static str,
        error: String,
    },
}

impl AppError {
    pub fn internal(message: &'static str, error: impl std::fmt::Display) -> Self {
        AppError::Internal {
            message,
            error: error.to_string(),
        }
    }

    /// Map a store failure for the given operation. Unique violations mean a concurrent
    /// registration won the race for the username.
    pub fn from_store(message: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => AppError::UsernameTaken,
            other => AppError::internal(message, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredentials | AppError::UsernameTaken => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::TokenRequired | AppError::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Internal { message, error } => {
                tracing::error!(%error, "{}", message);
                json!({ "message": message, "error": error })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
