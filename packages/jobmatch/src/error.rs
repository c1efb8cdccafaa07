//! Typed errors for the job-match pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::types::BatchStatus;

/// Errors that can occur during a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error (missing credentials, malformed settings)
    #[error("config error: {0}")]
    Config(String),

    /// Scrape platform call failed
    #[error("scrape error: {0}")]
    Scrape(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Inference service call failed (upload, submission, status, download)
    #[error("inference error: {0}")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Record store operation failed
    #[error("record store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The batch reached a terminal non-success status
    #[error("batch {batch_id} ended with status {status}")]
    BatchFailed {
        batch_id: String,
        status: BatchStatus,
    },

    /// The poll loop exceeded its wall-clock deadline
    #[error("batch {batch_id} did not complete within {hours}h")]
    BatchTimeout { batch_id: String, hours: i64 },

    /// A completed batch carried no output artifact
    #[error("batch {batch_id} completed without an output file")]
    MissingOutput { batch_id: String },

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Filesystem error (artifacts, input files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
