//! Error types for the calculator core

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Calculator core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid operand for a unary function (e.g. square root of a negative)
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// Expression could not be evaluated (malformed input, division by zero,
    /// non-finite result)
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}
