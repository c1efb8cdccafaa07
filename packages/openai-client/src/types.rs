//! OpenAI API request and response types (batch subset).

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat Completion
// =============================================================================

/// Chat completion request body. Used as the per-line body of batch requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "gpt-4o", "gpt-4o-mini")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response body, as it appears inside batch output lines.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionBody {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessageResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
}

impl ChatCompletionBody {
    /// Content of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

// =============================================================================
// Files
// =============================================================================

/// Metadata for an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileData {
    pub id: String,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
}

// =============================================================================
// Batches
// =============================================================================

/// A batch job as returned by `POST /batches` and `GET /batches/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchData {
    pub id: String,

    /// Raw status string: validating, in_progress, finalizing, completed,
    /// failed, expired, cancelling, cancelled
    pub status: String,

    pub output_file_id: Option<String>,
    pub error_file_id: Option<String>,
}

/// One line of a newline-delimited batch request file.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequestItem {
    /// Caller-chosen correlation id, echoed back on the output line.
    pub custom_id: String,
    pub method: String,
    pub url: String,
    pub body: ChatRequest,
}

impl BatchRequestItem {
    /// Build a chat-completions batch line.
    pub fn chat(custom_id: impl Into<String>, body: ChatRequest) -> Self {
        Self {
            custom_id: custom_id.into(),
            method: "POST".to_string(),
            url: "/v1/chat/completions".to_string(),
            body,
        }
    }
}

/// One line of a batch output (or error) file.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchOutputItem {
    pub custom_id: String,
    pub response: Option<BatchItemResponse>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// The per-item HTTP response embedded in a batch output line.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItemResponse {
    pub status_code: u16,
    pub body: ChatCompletionBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_request_item_serializes_chat_shape() {
        let item = BatchRequestItem::chat(
            "match-0",
            ChatRequest::new("gpt-4o-mini").message(Message::user("hello")),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["custom_id"], "match-0");
        assert_eq!(json["method"], "POST");
        assert_eq!(json["url"], "/v1/chat/completions");
        assert_eq!(json["body"]["messages"][0]["role"], "user");
    }

    #[test]
    fn batch_output_item_parses_content() {
        let line = r#"{"id":"batch_req_1","custom_id":"match-3","response":{"status_code":200,"body":{"choices":[{"message":{"role":"assistant","content":"80,60,\"fit\""}}]}},"error":null}"#;
        let item: BatchOutputItem = serde_json::from_str(line).unwrap();
        assert_eq!(item.custom_id, "match-3");
        let body = item.response.unwrap().body;
        assert_eq!(body.first_content(), Some("80,60,\"fit\""));
    }
}
