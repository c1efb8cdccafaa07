//! `ScrapeRunner` implementation backed by the Apify platform.

use async_trait::async_trait;
use serde_json::Value;

use apify_client::ApifyClient;

use crate::error::{PipelineError, Result};
use crate::traits::ScrapeRunner;

#[async_trait]
impl ScrapeRunner for ApifyClient {
    async fn run_task(&self, actor_id: &str, input: &Value) -> Result<Vec<Value>> {
        self.run_actor(actor_id, input)
            .await
            .map_err(|e| PipelineError::Scrape(Box::new(e)))
    }
}
