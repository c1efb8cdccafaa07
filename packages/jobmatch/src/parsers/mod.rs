//! Source-specific parsing of raw scrape batches.
//!
//! Each scrape actor returns its own item shape; a [`RawJobParser`] projects
//! those items into [`Job`]s. Parsers are looked up by actor name in a
//! [`ParserRegistry`], so adding a source never touches the orchestrator.

pub mod indeed;
pub mod ziprecruiter;

pub use indeed::IndeedParser;
pub use ziprecruiter::ZipRecruiterParser;

use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::types::{Job, ScrapeBatch};

/// Projects one raw batch into normalized jobs.
pub trait RawJobParser: Send + Sync {
    fn parse(&self, batch: &ScrapeBatch) -> Vec<Job>;
}

/// Maps actor name to its parser.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn RawJobParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in parser registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("memo23/apify-ziprecruiter-scraper", ZipRecruiterParser);
        registry.register("curious_coder/indeed-scraper", IndeedParser);
        registry
    }

    pub fn register(&mut self, actor_name: impl Into<String>, parser: impl RawJobParser + 'static) {
        self.parsers.insert(actor_name.into(), Box::new(parser));
    }

    /// Parse every batch through its registered parser. A batch from an
    /// unregistered actor logs a warning and contributes no jobs.
    pub fn parse_all(&self, batches: &[ScrapeBatch]) -> Vec<Job> {
        batches
            .iter()
            .flat_map(|batch| match self.parsers.get(&batch.actor_name) {
                Some(parser) => parser.parse(batch),
                None => {
                    warn!(actor = %batch.actor_name, "No parser found for actor");
                    Vec::new()
                }
            })
            .collect()
    }
}

/// Apify console link used in the source attribution column.
pub(crate) fn source_attribution(site: &str, actor_id: &str) -> String {
    format!(
        "{} via Apify https://console.apify.com/actors/{}/information/latest/readme",
        site, actor_id
    )
}

/// Fetch a string field from a raw item, defaulting to empty.
pub(crate) fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
