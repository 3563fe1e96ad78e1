//! Error types for Glossa directories

use thiserror::Error;

/// Failure reported by a user or organization directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Directory backend error: {0}")]
    Backend(String),
}

impl DirectoryError {
    pub fn user_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("user {id}"))
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DirectoryError::NotFound("row".to_string()),
            other => DirectoryError::Backend(other.to_string()),
        }
    }
}
