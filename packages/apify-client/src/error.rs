//! Error types for the Apify client.

use thiserror::Error;

/// Result type for Apify client operations.
pub type Result<T> = std::result::Result<T, ApifyError>;

/// Apify client errors.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Transport-level failure (connection, TLS, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the Apify API.
    #[error("Apify API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The actor run reached a non-success terminal status.
    #[error("actor run ended with status {0}")]
    RunFailed(String),
}
