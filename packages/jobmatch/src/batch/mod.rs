//! Batch evaluation of jobs against a candidate profile.
//!
//! One submission per pipeline run: build a newline-delimited request file
//! (one chat request per job, correlated by `match-<index>`), upload and
//! register the bulk job, poll with capped backoff until a terminal status,
//! then parse whatever completed. The flow is
//! `building → submitted → polling → {completed | failed | cancelled | expired}`;
//! only `polling` loops, and it is bounded by a hard 24h deadline.

pub mod backoff;
pub mod openai;
pub mod parse;
pub mod prompts;

pub use backoff::Backoff;

use chrono::Duration as ChronoDuration;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use openai_client::{BatchRequestItem, ChatRequest, Message};

use crate::artifacts;
use crate::error::{PipelineError, Result};
use crate::traits::{BatchInference, Clock};
use crate::types::{BatchJob, BatchStatus, Job, MatchEvaluation};

/// Tunables for one evaluator instance.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Model named in every request line.
    pub model: String,

    /// First poll delay.
    pub poll_initial: Duration,

    /// Per-poll delay multiplier.
    pub poll_multiplier: f64,

    /// Poll delay cap.
    pub poll_max: Duration,

    /// Wall-clock deadline measured from submission.
    pub deadline: ChronoDuration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            poll_initial: Duration::from_millis(1000),
            poll_multiplier: 1.2,
            poll_max: Duration::from_millis(600_000),
            deadline: ChronoDuration::hours(24),
        }
    }
}

/// Drives one bulk-inference job to completion.
pub struct BatchEvaluator<I, C> {
    inference: I,
    clock: C,
    options: BatchOptions,
    artifact_dir: Option<PathBuf>,
}

impl<I: BatchInference, C: Clock> BatchEvaluator<I, C> {
    pub fn new(inference: I, clock: C) -> Self {
        Self {
            inference,
            clock,
            options: BatchOptions::default(),
            artifact_dir: None,
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Archive request/output/error files under this directory.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Evaluate every job; returns exactly one result per job, in input
    /// order. Submission failures, terminal non-success statuses, and the
    /// deadline are fatal for the whole batch; per-line response damage is
    /// not.
    pub async fn evaluate(
        &self,
        jobs: &[Job],
        candidate_summary: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchEvaluation>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let run_ts = artifacts::timestamp(self.clock.now());

        // Build
        let request_file = build_request_file(jobs, candidate_summary, &self.options.model)?;
        if let Some(dir) = &self.artifact_dir {
            artifacts::write_text(dir, &format!("batch_requests_{}.jsonl", run_ts), &request_file)
                .await?;
        }

        // Submit: fatal on transport error, no retry.
        let file_id = self.inference.create_file(request_file).await?;
        let batch_id = self.inference.submit_batch(&file_id).await?;
        info!(batch_id = %batch_id, jobs = jobs.len(), "Submitted evaluation batch");

        // Poll
        let job = self.poll(&batch_id, cancel).await?;

        // Partial per-item failures inside a completed batch: archive and
        // continue with whatever succeeded.
        if let Some(error_file_id) = &job.error_file_id {
            warn!(batch_id = %batch_id, "Batch completed with an error artifact");
            match self.inference.read_file(error_file_id).await {
                Ok(content) => {
                    if let Some(dir) = &self.artifact_dir {
                        artifacts::write_text(
                            dir,
                            &format!("batch_errors_{}.jsonl", run_ts),
                            &content,
                        )
                        .await?;
                    }
                }
                Err(e) => warn!(error = %e, "Could not fetch batch error artifact"),
            }
        }

        let output_file_id = job.output_file_id.ok_or(PipelineError::MissingOutput {
            batch_id: batch_id.clone(),
        })?;
        let raw_output = self.inference.read_file(&output_file_id).await?;
        if let Some(dir) = &self.artifact_dir {
            artifacts::write_text(dir, &format!("batch_output_{}.jsonl", run_ts), &raw_output)
                .await?;
        }

        Ok(parse::parse_batch_output(
            &raw_output,
            jobs.len(),
            self.clock.now(),
        ))
    }

    /// Poll until a terminal status or the deadline. Cancellable between polls.
    async fn poll(&self, batch_id: &str, cancel: &CancellationToken) -> Result<BatchJob> {
        let submitted_at = self.clock.now();
        let deadline = submitted_at + self.options.deadline;
        let mut backoff = Backoff::new(
            self.options.poll_initial,
            self.options.poll_multiplier,
            self.options.poll_max,
        );

        loop {
            let job = self.inference.batch_status(batch_id).await?;
            match job.status {
                BatchStatus::Completed => return Ok(job),
                BatchStatus::Failed | BatchStatus::Cancelled | BatchStatus::Expired => {
                    return Err(PipelineError::BatchFailed {
                        batch_id: batch_id.to_string(),
                        status: job.status,
                    });
                }
                BatchStatus::Queued | BatchStatus::InProgress => {}
            }

            if self.clock.now() >= deadline {
                return Err(PipelineError::BatchTimeout {
                    batch_id: batch_id.to_string(),
                    hours: self.options.deadline.num_hours(),
                });
            }

            let delay = backoff.next_delay();
            debug!(batch_id, status = %job.status, delay_ms = delay.as_millis() as u64, "Batch still running");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                _ = self.clock.sleep(delay) => {}
            }
        }
    }
}

/// One newline-delimited chat request per job, correlated by `match-<index>`.
fn build_request_file(jobs: &[Job], candidate_summary: &str, model: &str) -> Result<String> {
    let mut lines = Vec::with_capacity(jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        let request = ChatRequest::new(model)
            .message(Message::user(prompts::evaluation_prompt(job, candidate_summary)));
        let item = BatchRequestItem::chat(parse::correlation_id(index), request);
        lines.push(serde_json::to_string(&item)?);
    }
    Ok(lines.join("\n"))
}
