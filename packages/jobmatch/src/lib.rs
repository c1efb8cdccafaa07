//! Job Matching Pipeline
//!
//! Scrapes job postings from multiple sources, deduplicates them against an
//! append-only record store, scores each new posting against a candidate
//! summary via bulk inference, and appends the ranked results.
//!
//! # Design
//!
//! - One run is one pass; nothing is retried across runs
//! - Every external system sits behind a trait (scraping, inference,
//!   storage, time), so the whole pipeline runs against mocks
//! - Raw scrape output and batch files are archived as timestamped
//!   artifacts before any downstream stage consumes them
//!
//! # Usage
//!
//! ```rust,ignore
//! use jobmatch::{Config, Pipeline, PipelineOptions};
//! use jobmatch::batch::BatchEvaluator;
//! use jobmatch::stores::JsonlStore;
//! use jobmatch::traits::SystemClock;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = Config::from_env()?;
//! let summary = config.load_candidate_summary().await?;
//!
//! let scraper = Arc::new(apify_client::ApifyClient::new(config.apify_api_key.clone()));
//! let inference = openai_client::OpenAIClient::new(config.openai_api_key.clone());
//! let store = JsonlStore::new(&config.store_path, JsonlStore::default_header());
//!
//! let evaluator = BatchEvaluator::new(inference, SystemClock);
//! let pipeline = Pipeline::new(scraper, evaluator, store, SystemClock, PipelineOptions::default());
//! let report = pipeline.run(&summary, &CancellationToken::new()).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (ScrapeRunner, BatchInference, RecordStore, Clock)
//! - [`types`] - Domain data types
//! - [`scrape`] - Bounded-concurrency fetch orchestration
//! - [`parsers`] - Source-specific raw item parsing
//! - [`dedup`] - Normalization-based deduplication
//! - [`batch`] - Bulk-inference submit/poll/parse
//! - [`stores`] - Record store implementations
//! - [`pipeline`] - End-to-end driver
//! - [`testing`] - Mock implementations for testing

pub mod artifacts;
pub mod batch;
pub mod config;
pub mod dedup;
pub mod error;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod scrape;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::Config;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
pub use types::{BatchStatus, Job, MatchEvaluation};
