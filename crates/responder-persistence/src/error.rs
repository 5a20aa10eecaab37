//! Error types for persistence operations.

use std::path::PathBuf;

use responder_models::PhoneError;
use thiserror::Error;

/// Errors that can occur while reading or writing state files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file does not exist.
    #[error("file not found: {}", path.display())]
    Missing {
        /// Path that was expected.
        path: PathBuf,
    },

    /// Reading the file failed.
    #[error("failed to read {}: {source}", path.display())]
    ReadError {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the file failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating a parent directory failed.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryError {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file content is not valid JSON of the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A phone number failed validation.
    #[error("invalid phone number: {0}")]
    InvalidNumber(#[from] PhoneError),

    /// The file already exists and would be overwritten.
    #[error("file already exists: {}", path.display())]
    AlreadyExists {
        /// Existing path.
        path: PathBuf,
    },
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
