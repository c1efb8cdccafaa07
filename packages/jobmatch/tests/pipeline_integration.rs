//! Integration tests for the full pipeline loop.
//!
//! These tests verify the complete workflow against mocks:
//! 1. Discover input files and run scrape tasks concurrently
//! 2. Parse raw items into jobs
//! 3. Deduplicate against the record store and within the run
//! 4. Batch-evaluate the survivors
//! 5. Append the ranked rows

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::fs;
use tokio_util::sync::CancellationToken;

use chrono::{TimeZone, Utc};
use jobmatch::batch::BatchEvaluator;
use jobmatch::stores::{JsonlStore, MemoryStore};
use jobmatch::testing::{ManualClock, MockBatchInference, MockScrapeRunner};
use jobmatch::{BatchStatus, Config, Pipeline, PipelineOptions};

struct Workspace {
    base: PathBuf,
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    async fn new(tag: &str) -> Self {
        let base = std::env::temp_dir().join(format!(
            "jobmatch-integration-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&base).await;
        let input_dir = base.join("inputs");
        let output_dir = base.join("outputs");
        fs::create_dir_all(&input_dir).await.unwrap();
        fs::create_dir_all(&output_dir).await.unwrap();
        Self {
            base,
            input_dir,
            output_dir,
        }
    }

    async fn write_input(&self, name: &str, body: &Value) {
        fs::write(
            self.input_dir.join(name),
            serde_json::to_vec(body).unwrap(),
        )
        .await
        .unwrap();
    }

    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            actors: Config::actors(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            ..Default::default()
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.base);
    }
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 24, 9, 0, 0).unwrap())
}

fn output_line(custom_id: &str, content: &str) -> String {
    json!({
        "custom_id": custom_id,
        "response": {
            "status_code": 200,
            "body": {"choices": [{"message": {"role": "assistant", "content": content}}]}
        }
    })
    .to_string()
}

fn zip_item(title: &str, company: &str, city: &str, description: &str) -> Value {
    json!({
        "Title": title,
        "OrgName": company,
        "City": city,
        "Href": format!("https://ziprecruiter.com/job/{title}"),
        "FormattedSalaryShort": "$20/hr",
        "EmploymentType": "Full-time",
        "description": description,
    })
}

#[tokio::test]
async fn scrape_to_store_end_to_end() {
    let ws = Workspace::new("end-to-end").await;
    ws.write_input("vQO5g45mnm8jwognj_la.json", &json!({"search": "baker"}))
        .await;

    // Two distinct jobs, one in-run duplicate pair (location differs only by
    // the comma suffix, last occurrence wins), and one job already recorded.
    let scraper = Arc::new(MockScrapeRunner::new(vec![
        zip_item("Baker", "AcmeCo", "Los Angeles, CA", "first posting"),
        zip_item("Chef", "Initech", "LA", "cook things"),
        zip_item("Baker", "AcmeCo", "Los Angeles", "second posting"),
        zip_item("Old Job", "Stale", "LA", "seen before"),
    ]));

    let output = [
        output_line("match-0", "60,50,\"solid\""),
        output_line("match-1", "90,80,\"great\""),
    ]
    .join("\n");
    let inference = MockBatchInference::new()
        .with_statuses([
            BatchStatus::Queued,
            BatchStatus::InProgress,
            BatchStatus::Completed,
        ])
        .with_output_file(output);

    let clock = clock();
    let store = MemoryStore::with_rows(vec![
        JsonlStore::default_header(),
        vec!["Old Job".to_string(), "Stale".to_string(), "LA".to_string()],
    ]);

    let pipeline = Pipeline::new(
        Arc::clone(&scraper),
        BatchEvaluator::new(inference.clone(), clock.clone()).with_artifact_dir(&ws.output_dir),
        store.clone(),
        clock,
        ws.options(),
    );
    let report = pipeline
        .run("Ten years of artisan baking.", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.fetched_batches, 1);
    assert!(report.scrape_failures.is_empty());
    assert_eq!(report.parsed_jobs, 4);
    assert_eq!(report.new_jobs, 2);
    assert_eq!(report.rows_appended, 2);

    // The duplicate kept its first position but carries the later payload.
    let uploaded = inference.uploaded_files();
    assert_eq!(uploaded.len(), 1);
    let lines: Vec<&str> = uploaded[0].lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("second posting"));
    assert!(!uploaded[0].contains("first posting"));
    assert!(!uploaded[0].contains("Old Job"));
    assert!(uploaded[0].contains("Ten years of artisan baking."));

    // Ranked best-first after the seeded rows.
    let rows = store.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2][0], "Chef");
    assert_eq!(rows[2][7], "72");
    assert_eq!(rows[3][0], "Baker");
    assert_eq!(rows[3][7], "30");
    assert!(rows[3][6].starts_with("ZipRecruiter via Apify"));
}

#[tokio::test]
async fn failed_scrape_task_does_not_stop_the_run() {
    let ws = Workspace::new("failure").await;
    ws.write_input("vQO5g45mnm8jwognj_la.json", &json!({"search": "baker"}))
        .await;
    ws.write_input("vQO5g45mnm8jwognj_ny.json", &json!({"fail": true}))
        .await;

    let scraper = Arc::new(MockScrapeRunner::new(vec![zip_item(
        "Baker",
        "AcmeCo",
        "LA",
        "bake bread",
    )]));
    let inference = MockBatchInference::new()
        .with_statuses([BatchStatus::Completed])
        .with_output_file(output_line("match-0", "80,60,\"ok\""));

    let clock = clock();
    let store = MemoryStore::with_rows(vec![JsonlStore::default_header()]);

    let pipeline = Pipeline::new(
        scraper,
        BatchEvaluator::new(inference, clock.clone()),
        store.clone(),
        clock,
        ws.options(),
    );
    let report = pipeline
        .run("summary", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.fetched_batches, 1);
    assert_eq!(report.scrape_failures.len(), 1);
    assert!(report.scrape_failures[0].input.contains("_ny.json"));
    assert_eq!(report.rows_appended, 1);
    assert_eq!(store.rows()[1][0], "Baker");
}

#[tokio::test]
async fn artifacts_are_archived_along_the_way() {
    let ws = Workspace::new("artifacts").await;
    ws.write_input("vQO5g45mnm8jwognj_la.json", &json!({"search": "baker"}))
        .await;

    let scraper = Arc::new(MockScrapeRunner::new(vec![zip_item(
        "Baker",
        "AcmeCo",
        "LA",
        "bake bread",
    )]));
    let inference = MockBatchInference::new()
        .with_statuses([BatchStatus::Completed])
        .with_output_file(output_line("match-0", "80,60,\"ok\""));

    let clock = clock();
    let store = MemoryStore::with_rows(vec![JsonlStore::default_header()]);

    let pipeline = Pipeline::new(
        scraper,
        BatchEvaluator::new(inference, clock.clone()).with_artifact_dir(&ws.output_dir),
        store.clone(),
        clock,
        ws.options(),
    );
    pipeline
        .run("summary", &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<String> = std::fs::read_dir(&ws.output_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    assert!(names.iter().any(|n| n.starts_with("vQO5g45mnm8jwognj_la_output_")));
    assert!(names.iter().any(|n| n.starts_with("batch_requests_")));
    assert!(names.iter().any(|n| n.starts_with("batch_output_")));
    assert!(names.iter().any(|n| n.starts_with("ranked_jobs_")));
}
