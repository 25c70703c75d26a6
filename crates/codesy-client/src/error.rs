//! Client error types.

/// Errors that can occur when talking to the codesy site.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success response.
    #[error("API error: HTTP {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response excerpt.
        message: String,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
