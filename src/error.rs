//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use crate::models::ImageOperation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{}", .0.no_image_message())]
    NoImage(ImageOperation),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database not available")]
    StorageUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl Error {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether a repeated attempt of the same database write may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Database(sqlx::Error::Io(_))
                | Error::Database(sqlx::Error::PoolTimedOut)
                | Error::Database(sqlx::Error::WorkerCrashed)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
