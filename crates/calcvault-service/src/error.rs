//! Error types for session operations

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Calculator error
    #[error("Calculator error: {0}")]
    Calculator(#[from] calcvault_core::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] calcvault_storage_sqlite::Error),

    /// PIN rejected by validation
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    /// Remote mirror error
    #[error("Mirror error: {0}")]
    Mirror(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
