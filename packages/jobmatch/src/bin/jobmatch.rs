//! Job Matching Pipeline CLI
//!
//! Runs one full pipeline pass: scrape, dedup, batch-evaluate, record.

use std::sync::Arc;

use anyhow::{Context, Result};
use apify_client::ApifyClient;
use openai_client::OpenAIClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobmatch::batch::BatchEvaluator;
use jobmatch::stores::JsonlStore;
use jobmatch::traits::SystemClock;
use jobmatch::{Config, Pipeline, PipelineOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jobmatch=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting job matching pipeline");

    let config = Config::from_env().context("Failed to load configuration")?;
    let candidate_summary = config
        .load_candidate_summary()
        .await
        .context("Failed to load candidate summary")?;

    let scraper = Arc::new(ApifyClient::new(config.apify_api_key.clone()));
    let inference = OpenAIClient::new(config.openai_api_key.clone());
    let store = JsonlStore::new(&config.store_path, JsonlStore::default_header());

    let options = PipelineOptions {
        actors: Config::actors(),
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        concurrency: config.concurrency,
        debug_mode: config.debug_mode,
        ..Default::default()
    };

    let evaluator = BatchEvaluator::new(inference, SystemClock)
        .with_artifact_dir(&config.output_dir);
    let pipeline = Pipeline::new(scraper, evaluator, store, SystemClock, options);

    // Ctrl-C stops the batch poll loop at the next poll boundary.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            signal_cancel.cancel();
        }
    });

    let report = pipeline
        .run(&candidate_summary, &cancel)
        .await
        .context("Pipeline run failed")?;

    for failure in &report.scrape_failures {
        tracing::warn!(input = %failure.input, error = %failure.error, "Scrape task failed");
    }
    tracing::info!(
        batches = report.fetched_batches,
        parsed = report.parsed_jobs,
        new = report.new_jobs,
        appended = report.rows_appended,
        "Pipeline finished"
    );

    Ok(())
}
