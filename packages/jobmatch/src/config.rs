//! Application configuration loaded from environment variables.

use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::error::{PipelineError, Result};
use crate::scrape::DEFAULT_CONCURRENCY;
use crate::types::ActorRef;

/// Placeholder text shipped in the candidate summary template. A summary
/// still containing it has not been filled in.
const SUMMARY_PLACEHOLDER: &str = "[your resume]";

#[derive(Debug, Clone)]
pub struct Config {
    pub apify_api_key: String,
    pub openai_api_key: String,
    /// Plain-text summary of the candidate, embedded in every prompt.
    pub candidate_summary_path: PathBuf,
    /// Directory of per-actor scrape input files.
    pub input_dir: PathBuf,
    /// Directory where scrape and batch artifacts are written.
    pub output_dir: PathBuf,
    /// Path of the local record store file.
    pub store_path: PathBuf,
    pub concurrency: usize,
    /// Replay saved scrape outputs instead of hitting the scrape platform.
    pub debug_mode: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            apify_api_key: require("APIFY_API_KEY")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            candidate_summary_path: env::var("CANDIDATE_SUMMARY_PATH")
                .unwrap_or_else(|_| "candidate_summary.txt".to_string())
                .into(),
            input_dir: env::var("INPUT_DIR")
                .unwrap_or_else(|_| "apify_inputs".to_string())
                .into(),
            output_dir: env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "apify_outputs".to_string())
                .into(),
            store_path: env::var("STORE_PATH")
                .unwrap_or_else(|_| "matched_jobs.jsonl".to_string())
                .into(),
            concurrency: match env::var("SCRAPE_CONCURRENCY") {
                Ok(raw) => raw.parse().map_err(|_| {
                    PipelineError::Config("SCRAPE_CONCURRENCY must be a valid number".to_string())
                })?,
                Err(_) => DEFAULT_CONCURRENCY,
            },
            debug_mode: env::var("DEBUG_MODE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// The scrape sources this pipeline pulls from. Ids are the platform's
    /// opaque actor ids; names match the parser registry.
    pub fn actors() -> Vec<ActorRef> {
        vec![
            ActorRef::new("vQO5g45mnm8jwognj", "memo23/apify-ziprecruiter-scraper"),
            ActorRef::new("qA8rz8tR61HdkfTBL", "curious_coder/indeed-scraper"),
        ]
    }

    /// Read and validate the candidate summary.
    ///
    /// Rejects an empty file and the unedited template, since a prompt
    /// built on either would score every job against nothing.
    pub async fn load_candidate_summary(&self) -> Result<String> {
        let summary = tokio::fs::read_to_string(&self.candidate_summary_path)
            .await
            .map_err(|_| {
                PipelineError::Config(format!(
                    "candidate summary not found at {}",
                    self.candidate_summary_path.display()
                ))
            })?;
        validate_candidate_summary(&summary)?;
        Ok(summary)
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| PipelineError::Config(format!("{name} must be set")))
}

fn validate_candidate_summary(summary: &str) -> Result<()> {
    if summary.trim().is_empty() {
        return Err(PipelineError::Config(
            "candidate summary is empty".to_string(),
        ));
    }
    if summary.contains(SUMMARY_PLACEHOLDER) {
        return Err(PipelineError::Config(format!(
            "candidate summary still contains the {SUMMARY_PLACEHOLDER} placeholder"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_summary() {
        assert!(validate_candidate_summary("   \n").is_err());
    }

    #[test]
    fn rejects_unedited_template() {
        assert!(validate_candidate_summary("Paste [your resume] here.").is_err());
    }

    #[test]
    fn accepts_filled_in_summary() {
        assert!(validate_candidate_summary("Ten years baking sourdough at scale.").is_ok());
    }
}
