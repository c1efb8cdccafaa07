//! Bulk inference service seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::BatchJob;

/// A remote bulk-inference service driven through file upload, batch
/// submission, status polling, and artifact download.
#[async_trait]
pub trait BatchInference: Send + Sync {
    /// Upload a newline-delimited request file; returns its file id.
    async fn create_file(&self, content: String) -> Result<String>;

    /// Register a bulk job over an uploaded file; returns the batch id.
    async fn submit_batch(&self, file_id: &str) -> Result<String>;

    /// Fetch current status and artifact ids for a batch.
    async fn batch_status(&self, batch_id: &str) -> Result<BatchJob>;

    /// Download the raw content of an artifact file.
    async fn read_file(&self, file_id: &str) -> Result<String>;
}
