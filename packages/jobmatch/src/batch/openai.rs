//! `BatchInference` implementation backed by the OpenAI Batch API.

use async_trait::async_trait;
use tracing::warn;

use openai_client::OpenAIClient;

use crate::error::{PipelineError, Result};
use crate::traits::BatchInference;
use crate::types::{BatchJob, BatchStatus};

/// Map a raw API status string onto the six-state interface vocabulary.
///
/// The service reports a few transient sub-states (`validating`,
/// `finalizing`, `cancelling`) that the pipeline treats as still running;
/// anything unrecognized also keeps the poll loop alive rather than
/// aborting the batch.
fn map_status(raw: &str) -> BatchStatus {
    if let Some(status) = BatchStatus::parse(raw) {
        return status;
    }
    match raw {
        "validating" => BatchStatus::Queued,
        "finalizing" | "cancelling" => BatchStatus::InProgress,
        other => {
            warn!(status = other, "Unknown batch status, treating as in progress");
            BatchStatus::InProgress
        }
    }
}

#[async_trait]
impl BatchInference for OpenAIClient {
    async fn create_file(&self, content: String) -> Result<String> {
        let file = self
            .upload_batch_file(content)
            .await
            .map_err(|e| PipelineError::Inference(Box::new(e)))?;
        Ok(file.id)
    }

    async fn submit_batch(&self, file_id: &str) -> Result<String> {
        let batch = self
            .create_batch(file_id)
            .await
            .map_err(|e| PipelineError::Inference(Box::new(e)))?;
        Ok(batch.id)
    }

    async fn batch_status(&self, batch_id: &str) -> Result<BatchJob> {
        let batch = self
            .get_batch(batch_id)
            .await
            .map_err(|e| PipelineError::Inference(Box::new(e)))?;
        Ok(BatchJob {
            batch_id: batch.id,
            status: map_status(&batch.status),
            output_file_id: batch.output_file_id,
            error_file_id: batch.error_file_id,
        })
    }

    async fn read_file(&self, file_id: &str) -> Result<String> {
        self.file_content(file_id)
            .await
            .map_err(|e| PipelineError::Inference(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_statuses_map_directly() {
        assert_eq!(map_status("queued"), BatchStatus::Queued);
        assert_eq!(map_status("in_progress"), BatchStatus::InProgress);
        assert_eq!(map_status("completed"), BatchStatus::Completed);
        assert_eq!(map_status("failed"), BatchStatus::Failed);
        assert_eq!(map_status("cancelled"), BatchStatus::Cancelled);
        assert_eq!(map_status("expired"), BatchStatus::Expired);
    }

    #[test]
    fn transient_substates_keep_polling() {
        assert_eq!(map_status("validating"), BatchStatus::Queued);
        assert_eq!(map_status("finalizing"), BatchStatus::InProgress);
        assert_eq!(map_status("cancelling"), BatchStatus::InProgress);
        assert_eq!(map_status("some_future_state"), BatchStatus::InProgress);
    }
}
