//! Error types for the runtime crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading a communication history database.
///
/// Always transient from the watcher's point of view: logged, marker
/// untouched, retried next interval.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The database could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Database path.
        path: PathBuf,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },

    /// A query failed.
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// The blocking read task did not complete.
    #[error("read task failed: {0}")]
    Task(String),
}

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Runtime not started.
    #[error("runtime not started")]
    NotStarted,

    /// Runtime already started.
    #[error("runtime already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
