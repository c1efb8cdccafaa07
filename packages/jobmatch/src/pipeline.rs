//! End-to-end pipeline: scrape, parse, dedup, evaluate, record.
//!
//! One run is one pass. Every stage hands a plain value to the next, so
//! a stage can be replayed or tested in isolation; only the final append
//! mutates the record store.

use serde::Serialize;
use std::cmp::Reverse;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::artifacts;
use crate::batch::BatchEvaluator;
use crate::dedup;
use crate::error::Result;
use crate::parsers::ParserRegistry;
use crate::scrape::{self, DEFAULT_CONCURRENCY};
use crate::traits::{BatchInference, Clock, RecordStore, ScrapeRunner};
use crate::types::{ActorRef, Job, MatchEvaluation, ScrapeBatch, ScrapeFailure};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Scrape sources to pull from.
    pub actors: Vec<ActorRef>,
    /// Directory of per-actor input files.
    pub input_dir: PathBuf,
    /// Directory for raw scrape artifacts and batch snapshots.
    pub output_dir: PathBuf,
    /// Concurrent scrape task limit.
    pub concurrency: usize,
    /// Replay saved scrape artifacts instead of fetching.
    pub debug_mode: bool,
    /// Rows per store append.
    pub chunk_size: usize,
    /// Pause between chunked appends, for store rate limits.
    pub chunk_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            actors: Vec::new(),
            input_dir: PathBuf::from("apify_inputs"),
            output_dir: PathBuf::from("apify_outputs"),
            concurrency: DEFAULT_CONCURRENCY,
            debug_mode: false,
            chunk_size: 1000,
            chunk_delay: Duration::from_millis(1000),
        }
    }
}

/// What a completed run did, for the caller's summary log.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub fetched_batches: usize,
    pub scrape_failures: Vec<ScrapeFailure>,
    pub parsed_jobs: usize,
    pub new_jobs: usize,
    pub rows_appended: usize,
}

#[derive(Serialize)]
struct RankedJob<'a> {
    job: &'a Job,
    evaluation: &'a MatchEvaluation,
}

/// Owns one configured pass over every stage.
pub struct Pipeline<S: ?Sized, I, R, C> {
    scraper: Arc<S>,
    evaluator: BatchEvaluator<I, C>,
    store: R,
    clock: C,
    options: PipelineOptions,
}

impl<S, I, R, C> Pipeline<S, I, R, C>
where
    S: ScrapeRunner + ?Sized + 'static,
    I: BatchInference,
    R: RecordStore,
    C: Clock + Clone + 'static,
{
    pub fn new(
        scraper: Arc<S>,
        evaluator: BatchEvaluator<I, C>,
        store: R,
        clock: C,
        options: PipelineOptions,
    ) -> Self {
        Self {
            scraper,
            evaluator,
            store,
            clock,
            options,
        }
    }

    /// Run the whole pipeline once.
    ///
    /// Scrape failures are reported, not fatal. An empty post-dedup set
    /// short-circuits before any inference cost is incurred.
    pub async fn run(
        &self,
        candidate_summary: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        let existing_rows = self.store.read_all_rows().await?;
        info!(
            rows = existing_rows.len().saturating_sub(1),
            "Loaded existing records"
        );

        let (batches, failures) = self.fetch_batches(&self.options.actors).await?;
        report.fetched_batches = batches.len();
        report.scrape_failures = failures;

        let jobs = ParserRegistry::with_defaults().parse_all(&batches);
        report.parsed_jobs = jobs.len();
        info!(count = jobs.len(), "Parsed jobs from raw batches");

        // Row 0 is the header; everything after it participates in dedup.
        let existing_data = existing_rows.get(1..).unwrap_or_default();
        let new_jobs = dedup::filter_new(existing_data, jobs);
        report.new_jobs = new_jobs.len();
        if new_jobs.is_empty() {
            info!("No new jobs found after deduplication");
            return Ok(report);
        }

        let evaluations = self
            .evaluator
            .evaluate(&new_jobs, candidate_summary, cancel)
            .await?;

        let ranked = rank(new_jobs, evaluations);
        self.archive_ranked(&ranked).await?;

        let rows: Vec<Vec<String>> = ranked
            .iter()
            .map(|(job, eval)| job.to_row(eval))
            .collect();
        self.append_chunked(&rows).await?;
        report.rows_appended = rows.len();

        info!(rows = rows.len(), "Pipeline run complete");
        Ok(report)
    }

    async fn fetch_batches(
        &self,
        actors: &[ActorRef],
    ) -> Result<(Vec<ScrapeBatch>, Vec<ScrapeFailure>)> {
        if self.options.debug_mode {
            info!("Debug mode: replaying saved scrape outputs");
            let batches = scrape::load_saved_batches(&self.options.output_dir).await?;
            return Ok((batches, Vec::new()));
        }

        let tasks = scrape::discover_tasks(&self.options.input_dir, actors).await?;
        Ok(scrape::run_all(
            Arc::clone(&self.scraper),
            tasks,
            self.options.concurrency,
            &self.options.output_dir,
            &self.clock,
        )
        .await)
    }

    /// Snapshot the ranked results before any store write, so a failed
    /// append never loses the evaluation.
    async fn archive_ranked(&self, ranked: &[(Job, MatchEvaluation)]) -> Result<()> {
        let snapshot: Vec<RankedJob<'_>> = ranked
            .iter()
            .map(|(job, evaluation)| RankedJob { job, evaluation })
            .collect();
        let name = format!("ranked_jobs_{}.json", artifacts::timestamp(self.clock.now()));
        let written = artifacts::write_json(&self.options.output_dir, &name, &snapshot).await?;
        info!(artifact = %written.display(), "Wrote ranked results snapshot");
        Ok(())
    }

    async fn append_chunked(&self, rows: &[Vec<String>]) -> Result<()> {
        let chunks: Vec<&[Vec<String>]> = rows.chunks(self.options.chunk_size.max(1)).collect();
        info!(
            rows = rows.len(),
            chunks = chunks.len(),
            "Appending rows to record store"
        );
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                self.clock.sleep(self.options.chunk_delay).await;
            }
            self.store.append_rows(chunk).await?;
        }
        Ok(())
    }
}

/// Pair each job with its evaluation and sort by composite score,
/// best first. Unscored jobs sort as zero; ties keep input order.
fn rank(jobs: Vec<Job>, evaluations: Vec<MatchEvaluation>) -> Vec<(Job, MatchEvaluation)> {
    if jobs.len() != evaluations.len() {
        // evaluate() guarantees alignment; anything else is a logic error
        // upstream, so keep whatever pairs exist rather than panic.
        warn!(
            jobs = jobs.len(),
            evaluations = evaluations.len(),
            "Job and evaluation counts differ"
        );
    }
    let mut ranked: Vec<(Job, MatchEvaluation)> = jobs.into_iter().zip(evaluations).collect();
    ranked.sort_by_key(|(_, eval)| Reverse(eval.composite_score.unwrap_or(0)));
    ranked
}
