//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use glossa_shared::{DirectoryError, PaginationError};
use serde_json::json;

/// User-facing message codes for rejected requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    CannotDeleteYourOwnAccount,
    CannotDisableYourOwnAccount,
}

impl Message {
    pub fn code(&self) -> &'static str {
        match self {
            Message::CannotDeleteYourOwnAccount => "cannot_delete_your_own_account",
            Message::CannotDisableYourOwnAccount => "cannot_disable_your_own_account",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Message::CannotDeleteYourOwnAccount => "You cannot delete your own account",
            Message::CannotDisableYourOwnAccount => "You cannot disable your own account",
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Authentication errors
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Insufficient permissions")]
    Forbidden,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {}", .0.code())]
    BadRequest(Message),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),

            // Validation
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.code(), msg.text().to_string()),

            // Resources
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),

            // Internal
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", "Database error".to_string()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(what) => {
                tracing::debug!(%what, "Directory lookup missed");
                ApiError::NotFound
            }
            DirectoryError::Backend(msg) => {
                tracing::error!(error = %msg, "Directory backend error");
                ApiError::Database(msg)
            }
        }
    }
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
