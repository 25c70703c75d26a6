//! Error types for codesy core.

/// Result type for codesy core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in codesy core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
