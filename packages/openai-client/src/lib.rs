//! Pure OpenAI REST API client
//!
//! A clean, minimal client for the OpenAI Batch API with no domain-specific
//! logic. Supports uploading newline-delimited request files, creating and
//! polling batches, and downloading batch output files.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{BatchRequestItem, ChatRequest, Message, OpenAIClient};
//!
//! let client = OpenAIClient::from_env()?;
//!
//! // Build a JSONL request file: one line per request.
//! let lines: Vec<String> = prompts
//!     .iter()
//!     .enumerate()
//!     .map(|(i, p)| {
//!         let item = BatchRequestItem::chat(
//!             format!("match-{i}"),
//!             ChatRequest::new("gpt-4o-mini").message(Message::user(p)),
//!         );
//!         serde_json::to_string(&item).unwrap()
//!     })
//!     .collect();
//!
//! let file = client.upload_batch_file(lines.join("\n")).await?;
//! let batch = client.create_batch(&file.id).await?;
//!
//! // ... poll with get_batch(), then:
//! let output = client.file_content(&output_file_id).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a newline-delimited request file for batch processing.
    ///
    /// Corresponds to `POST /files` with purpose `batch`.
    pub async fn upload_batch_file(&self, content: String) -> Result<FileData> {
        let part = reqwest::multipart::Part::text(content)
            .file_name("batch_requests.jsonl")
            .mime_str("application/jsonl")
            .map_err(|e| OpenAIError::Parse(format!("Invalid mime type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "batch")
            .part("file", part);

        let response = self
            .http_client
            .post(format!("{}/files", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI file upload failed");
                OpenAIError::Network(e.to_string())
            })?;

        let file: FileData = Self::parse_json_response(response).await?;
        debug!(file_id = %file.id, "Uploaded batch request file");
        Ok(file)
    }

    /// Create a batch over an uploaded request file.
    ///
    /// Corresponds to `POST /batches` with the chat-completions endpoint and
    /// a 24h completion window.
    pub async fn create_batch(&self, input_file_id: &str) -> Result<BatchData> {
        let body = serde_json::json!({
            "input_file_id": input_file_id,
            "endpoint": "/v1/chat/completions",
            "completion_window": "24h",
        });

        let response = self
            .http_client
            .post(format!("{}/batches", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI batch creation failed");
                OpenAIError::Network(e.to_string())
            })?;

        let batch: BatchData = Self::parse_json_response(response).await?;
        debug!(batch_id = %batch.id, status = %batch.status, "Created batch");
        Ok(batch)
    }

    /// Retrieve current batch status and artifact ids.
    pub async fn get_batch(&self, batch_id: &str) -> Result<BatchData> {
        let response = self
            .http_client
            .get(format!("{}/batches/{}", self.base_url, batch_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI batch retrieval failed");
                OpenAIError::Network(e.to_string())
            })?;

        Self::parse_json_response(response).await
    }

    /// Download the raw content of a file (batch output or error file).
    pub async fn file_content(&self, file_id: &str) -> Result<String> {
        let response = self
            .http_client
            .get(format!("{}/files/{}/content", self.base_url, file_id))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI file download failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api(error_text));
        }

        response
            .text()
            .await
            .map_err(|e| OpenAIError::Network(e.to_string()))
    }

    async fn parse_json_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api(error_text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| OpenAIError::Network(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| OpenAIError::Parse(format!("Failed to parse response: {}", e)))
    }
}
