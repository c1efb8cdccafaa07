//! Testing utilities including mock implementations.
//!
//! Deterministic, call-tracked stand-ins for the scrape platform, the
//! inference service, and wall-clock time, so pipeline logic can be
//! exercised without network calls or real waiting.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::traits::{BatchInference, Clock, ScrapeRunner};
use crate::types::{BatchJob, BatchStatus};

/// A mock scrape platform.
///
/// Returns the configured item list for every task. A task whose input
/// carries `"fail": true` errors instead, which makes failure-isolation
/// scenarios trivial to stage from input files.
#[derive(Default)]
pub struct MockScrapeRunner {
    items: Vec<Value>,
    task_delay: Option<Duration>,
    calls: Arc<RwLock<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockScrapeRunner {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Hold each task open for `millis` so concurrency can be observed.
    pub fn with_task_delay(mut self, millis: u64) -> Self {
        self.task_delay = Some(Duration::from_millis(millis));
        self
    }

    /// Number of `run_task` calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Actor ids passed to `run_task`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Highest number of tasks observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScrapeRunner for MockScrapeRunner {
    async fn run_task(&self, actor_id: &str, input: &Value) -> Result<Vec<Value>> {
        self.calls.write().unwrap().push(actor_id.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.task_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if input.get("fail").and_then(Value::as_bool).unwrap_or(false) {
            return Err(PipelineError::Scrape("simulated network error".into()));
        }
        Ok(self.items.clone())
    }
}

/// File id the mock assigns to the uploaded request file.
pub const MOCK_INPUT_FILE: &str = "file-input";
/// File id carrying the batch output artifact.
pub const MOCK_OUTPUT_FILE: &str = "file-output";
/// File id carrying the batch error artifact.
pub const MOCK_ERROR_FILE: &str = "file-errors";

/// A mock bulk-inference service with a scripted status sequence.
///
/// Each `batch_status` call pops the next scripted status; the last one
/// repeats once the script is exhausted. `completed` statuses expose the
/// configured output (and error) artifact ids.
#[derive(Default)]
pub struct MockBatchInference {
    statuses: Arc<Mutex<VecDeque<BatchStatus>>>,
    last_status: Arc<Mutex<Option<BatchStatus>>>,
    output: Arc<RwLock<Option<String>>>,
    error: Arc<RwLock<Option<String>>>,
    uploaded: Arc<RwLock<Vec<String>>>,
    submitted: Arc<RwLock<Vec<String>>>,
    status_calls: Arc<AtomicUsize>,
    read_ids: Arc<RwLock<Vec<String>>>,
}

impl MockBatchInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the statuses returned by successive `batch_status` calls.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = BatchStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    /// Content served for the output artifact once completed.
    pub fn with_output_file(self, content: String) -> Self {
        *self.output.write().unwrap() = Some(content);
        self
    }

    /// Content served for the error artifact once completed.
    pub fn with_error_file(self, content: String) -> Self {
        *self.error.write().unwrap() = Some(content);
        self
    }

    /// Request file contents passed to `create_file`.
    pub fn uploaded_files(&self) -> Vec<String> {
        self.uploaded.read().unwrap().clone()
    }

    /// File ids passed to `submit_batch`.
    pub fn submitted_file_ids(&self) -> Vec<String> {
        self.submitted.read().unwrap().clone()
    }

    /// Number of `batch_status` calls made.
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// File ids passed to `read_file`.
    pub fn read_file_ids(&self) -> Vec<String> {
        self.read_ids.read().unwrap().clone()
    }
}

impl Clone for MockBatchInference {
    fn clone(&self) -> Self {
        Self {
            statuses: Arc::clone(&self.statuses),
            last_status: Arc::clone(&self.last_status),
            output: Arc::clone(&self.output),
            error: Arc::clone(&self.error),
            uploaded: Arc::clone(&self.uploaded),
            submitted: Arc::clone(&self.submitted),
            status_calls: Arc::clone(&self.status_calls),
            read_ids: Arc::clone(&self.read_ids),
        }
    }
}

#[async_trait]
impl BatchInference for MockBatchInference {
    async fn create_file(&self, content: String) -> Result<String> {
        self.uploaded.write().unwrap().push(content);
        Ok(MOCK_INPUT_FILE.to_string())
    }

    async fn submit_batch(&self, file_id: &str) -> Result<String> {
        self.submitted.write().unwrap().push(file_id.to_string());
        Ok("batch-1".to_string())
    }

    async fn batch_status(&self, batch_id: &str) -> Result<BatchJob> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        let status = {
            let mut queue = self.statuses.lock().unwrap();
            match queue.pop_front() {
                Some(status) => {
                    if queue.is_empty() {
                        *self.last_status.lock().unwrap() = Some(status);
                    }
                    status
                }
                None => self
                    .last_status
                    .lock()
                    .unwrap()
                    .unwrap_or(BatchStatus::Completed),
            }
        };

        let completed = status == BatchStatus::Completed;
        Ok(BatchJob {
            batch_id: batch_id.to_string(),
            status,
            output_file_id: (completed && self.output.read().unwrap().is_some())
                .then(|| MOCK_OUTPUT_FILE.to_string()),
            error_file_id: (completed && self.error.read().unwrap().is_some())
                .then(|| MOCK_ERROR_FILE.to_string()),
        })
    }

    async fn read_file(&self, file_id: &str) -> Result<String> {
        self.read_ids.write().unwrap().push(file_id.to_string());
        let content = match file_id {
            MOCK_OUTPUT_FILE => self.output.read().unwrap().clone(),
            MOCK_ERROR_FILE => self.error.read().unwrap().clone(),
            _ => None,
        };
        content.ok_or_else(|| PipelineError::Inference(format!("no such file: {file_id}").into()))
    }
}

/// A clock that only moves when slept on.
///
/// `sleep` advances simulated time by the requested duration and records
/// it, so a 24-hour poll deadline runs in microseconds.
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance time without a sleep call.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(duration).expect("advance fits in chrono range");
    }

    /// All sleep durations requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clone for ManualClock {
    fn clone(&self) -> Self {
        Self {
            now: Arc::clone(&self.now),
            sleeps: Arc::clone(&self.sleeps),
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}
