//! Scrape platform seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A remote scrape platform capable of running one actor task to completion.
///
/// The pipeline treats the platform as a black box returning raw,
/// vendor-specific item shapes; field mapping into [`crate::types::Job`]
/// happens later in the parser registry.
#[async_trait]
pub trait ScrapeRunner: Send + Sync {
    /// Run the given actor with the given input and return its item list.
    async fn run_task(&self, actor_id: &str, input: &Value) -> Result<Vec<Value>>;
}
