//! Storage error types

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Re-key verification error
    #[error("Re-key verification failed: {0}")]
    ReKey(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data is not in the expected format
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;
