//! Bounded-concurrency fetch orchestration.
//!
//! Runs many independent scrape tasks in parallel under a semaphore sized
//! for the remote platform's capacity (the starter plan allows ~10
//! concurrent runs of 4 GB each, so the default stays below that). Each
//! task is isolated: a failure is recorded and skipped, never retried, and
//! never aborts its siblings.

pub mod apify;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::artifacts;
use crate::error::Result;
use crate::traits::{Clock, ScrapeRunner};
use crate::types::{ActorRef, ScrapeBatch, ScrapeFailure, ScrapeTask};

/// Default concurrent task limit.
pub const DEFAULT_CONCURRENCY: usize = 7;

/// Discover scrape tasks: one per input file named `<actor_id>_*.json`.
pub async fn discover_tasks(input_dir: &Path, actors: &[ActorRef]) -> Result<Vec<ScrapeTask>> {
    info!("Reading input files from {}...", input_dir.display());

    let mut file_names = Vec::new();
    let mut entries = fs::read_dir(input_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            file_names.push(name.to_string());
        }
    }
    file_names.sort();

    let mut tasks = Vec::new();
    for actor in actors {
        let prefix = format!("{}_", actor.id);
        for name in &file_names {
            if name.starts_with(&prefix) && name.ends_with(".json") {
                tasks.push(ScrapeTask {
                    actor: actor.clone(),
                    input_path: input_dir.join(name),
                });
            }
        }
    }

    if tasks.is_empty() {
        warn!("No input files found for any scrape actors");
    }
    Ok(tasks)
}

/// Run every task with at most `concurrency` in flight.
///
/// Returns once all tasks have settled. Successes land in the result list
/// (and on disk as a timestamped raw artifact); failures land in the
/// failure list as `{input, error}` entries for the caller to log.
pub async fn run_all<S, C>(
    runner: Arc<S>,
    tasks: Vec<ScrapeTask>,
    concurrency: usize,
    output_dir: &Path,
    clock: &C,
) -> (Vec<ScrapeBatch>, Vec<ScrapeFailure>)
where
    S: ScrapeRunner + ?Sized + 'static,
    C: Clock + Clone + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let results: Arc<Mutex<Vec<ScrapeBatch>>> = Arc::new(Mutex::new(Vec::new()));
    let failures: Arc<Mutex<Vec<ScrapeFailure>>> = Arc::new(Mutex::new(Vec::new()));
    let output_dir = output_dir.to_path_buf();

    let mut handles = Vec::with_capacity(tasks.len());
    for task in tasks {
        let semaphore = Arc::clone(&semaphore);
        let runner = Arc::clone(&runner);
        let results = Arc::clone(&results);
        let failures = Arc::clone(&failures);
        let output_dir = output_dir.clone();
        let clock = clock.clone();

        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            match run_one(runner.as_ref(), &task, &output_dir, &clock).await {
                Ok(batch) => results.lock().await.push(batch),
                Err(e) => {
                    error!(
                        input = %task.input_path.display(),
                        error = %e,
                        "Error during job scraping"
                    );
                    failures.lock().await.push(ScrapeFailure {
                        input: task.input_path.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }));
    }

    // A panicked task is already isolated; nothing to salvage from it.
    let _ = futures::future::join_all(handles).await;

    let results = Arc::try_unwrap(results)
        .expect("all scrape tasks settled")
        .into_inner();
    let failures = Arc::try_unwrap(failures)
        .expect("all scrape tasks settled")
        .into_inner();

    info!("Total job lists fetched: {}", results.len());
    if !failures.is_empty() {
        warn!("Failed to process {} input files", failures.len());
    }

    (results, failures)
}

async fn run_one<S: ScrapeRunner + ?Sized, C: Clock>(
    runner: &S,
    task: &ScrapeTask,
    output_dir: &Path,
    clock: &C,
) -> Result<ScrapeBatch> {
    let input: Value = serde_json::from_slice(&fs::read(&task.input_path).await?)?;
    info!(
        actor = %task.actor.name,
        input = %task.input_path.display(),
        "Running scrape actor"
    );

    let items = runner.run_task(&task.actor.id, &input).await?;
    info!(
        count = items.len(),
        input = %task.input_path.display(),
        "Successfully fetched jobs"
    );

    let batch = ScrapeBatch {
        actor_id: task.actor.id.clone(),
        actor_name: task.actor.name.clone(),
        items,
    };

    let name = artifact_name(&task.input_path, clock.now());
    let written = artifacts::write_json(output_dir, &name, &batch).await?;
    info!(
        count = batch.items.len(),
        artifact = %written.display(),
        "Wrote raw scrape output"
    );

    Ok(batch)
}

/// `<input stem>_output_<ISO-8601 completion time>.json`
fn artifact_name(input_path: &Path, completed_at: DateTime<Utc>) -> String {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    format!("{}_output_{}.json", stem, artifacts::timestamp(completed_at))
}

/// Load previously saved raw batches from the output directory (debug replay).
pub async fn load_saved_batches(output_dir: &Path) -> Result<Vec<ScrapeBatch>> {
    let mut batches = Vec::new();
    let mut names = Vec::new();
    let mut entries = fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".json") {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    for name in names {
        let bytes = fs::read(output_dir.join(&name)).await?;
        match serde_json::from_slice::<ScrapeBatch>(&bytes) {
            Ok(batch) => batches.push(batch),
            Err(e) => warn!(file = %name, error = %e, "Skipping unreadable saved batch"),
        }
    }
    info!(count = batches.len(), "Loaded saved scrape batches");
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MockScrapeRunner};
    use crate::traits::SystemClock;
    use chrono::TimeZone;
    use serde_json::json;

    async fn temp_dirs(tag: &str) -> (PathBuf, PathBuf) {
        let base = std::env::temp_dir().join(format!("jobmatch-scrape-{}-{}", tag, std::process::id()));
        let input = base.join("inputs");
        let output = base.join("outputs");
        fs::create_dir_all(&input).await.unwrap();
        fs::create_dir_all(&output).await.unwrap();
        (input, output)
    }

    #[tokio::test]
    async fn discovers_tasks_per_actor_prefix() {
        let (input_dir, _output) = temp_dirs("discover").await;
        for name in ["aaa_la.json", "aaa_ny.json", "bbb_sf.json", "notes.txt", "ccc_x.json"] {
            fs::write(input_dir.join(name), b"{}").await.unwrap();
        }

        let actors = vec![
            ActorRef::new("aaa", "memo23/apify-ziprecruiter-scraper"),
            ActorRef::new("bbb", "curious_coder/indeed-scraper"),
        ];
        let tasks = discover_tasks(&input_dir, &actors).await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| {
            let name = t.input_path.file_name().unwrap().to_str().unwrap();
            name.starts_with(&format!("{}_", t.actor.id))
        }));
    }

    #[tokio::test]
    async fn one_failing_task_does_not_abort_siblings() {
        let (input_dir, output_dir) = temp_dirs("isolation").await;
        let actor = ActorRef::new("act1", "memo23/apify-ziprecruiter-scraper");

        let mut tasks = Vec::new();
        for i in 0..8 {
            let name = format!("act1_city{}.json", i);
            let body = if i == 3 {
                json!({"fail": true})
            } else {
                json!({"search": format!("job {}", i)})
            };
            fs::write(input_dir.join(&name), serde_json::to_vec(&body).unwrap())
                .await
                .unwrap();
            tasks.push(ScrapeTask {
                actor: actor.clone(),
                input_path: input_dir.join(&name),
            });
        }

        let runner = Arc::new(MockScrapeRunner::new(vec![json!({"Title": "Baker"})]));
        let (results, failures) = run_all(runner, tasks, 3, &output_dir, &SystemClock).await;

        assert_eq!(results.len(), 7);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].input.contains("act1_city3.json"));
    }

    #[tokio::test]
    async fn concurrency_stays_within_limit() {
        let (input_dir, output_dir) = temp_dirs("limit").await;
        let actor = ActorRef::new("act2", "curious_coder/indeed-scraper");

        let mut tasks = Vec::new();
        for i in 0..10 {
            let name = format!("act2_{}.json", i);
            fs::write(input_dir.join(&name), b"{}").await.unwrap();
            tasks.push(ScrapeTask {
                actor: actor.clone(),
                input_path: input_dir.join(&name),
            });
        }

        let runner = Arc::new(MockScrapeRunner::new(vec![]).with_task_delay(10));
        let (results, failures) =
            run_all(Arc::clone(&runner), tasks, 4, &output_dir, &SystemClock).await;

        assert_eq!(results.len(), 10);
        assert!(failures.is_empty());
        assert!(runner.max_in_flight() <= 4);
        assert_eq!(runner.call_count(), 10);
    }

    #[tokio::test]
    async fn raw_artifacts_are_written_per_success() {
        let (input_dir, output_dir) = temp_dirs("artifact").await;
        let actor = ActorRef::new("act3", "memo23/apify-ziprecruiter-scraper");
        fs::write(input_dir.join("act3_la.json"), b"{}").await.unwrap();

        let runner = Arc::new(MockScrapeRunner::new(vec![json!({"Title": "Baker"})]));
        let tasks = vec![ScrapeTask {
            actor,
            input_path: input_dir.join("act3_la.json"),
        }];
        let (results, _) = run_all(runner, tasks, 1, &output_dir, &SystemClock).await;
        assert_eq!(results.len(), 1);

        let loaded = load_saved_batches(&output_dir).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].actor_id, "act3");
        assert_eq!(loaded[0].items.len(), 1);
        let name_ok = {
            let mut entries = std::fs::read_dir(&output_dir).unwrap();
            let entry = entries.next().unwrap().unwrap();
            let name = entry.file_name().to_str().unwrap().to_string();
            name.starts_with("act3_la_output_") && name.ends_with(".json")
        };
        assert!(name_ok);
    }

    #[tokio::test]
    async fn artifact_names_come_from_the_injected_clock() {
        let (input_dir, output_dir) = temp_dirs("clock").await;
        let actor = ActorRef::new("act4", "memo23/apify-ziprecruiter-scraper");
        fs::write(input_dir.join("act4_la.json"), b"{}").await.unwrap();

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 24, 2, 49, 2).unwrap());
        let runner = Arc::new(MockScrapeRunner::new(vec![json!({"Title": "Baker"})]));
        let tasks = vec![ScrapeTask {
            actor,
            input_path: input_dir.join("act4_la.json"),
        }];
        let (results, _) = run_all(runner, tasks, 1, &output_dir, &clock).await;
        assert_eq!(results.len(), 1);

        let names: Vec<String> = std::fs::read_dir(&output_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["act4_la_output_2025-02-24T02:49:02.000Z.json".to_string()]);
    }
}
