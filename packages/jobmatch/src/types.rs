//! Core data types for the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// A scrape source: one remote actor plus a display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: String,
    pub name: String,
}

impl ActorRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One unit of scrape work: an actor and the input file that parameterizes it.
///
/// Created per discovered input file, consumed once by the orchestrator.
#[derive(Debug, Clone)]
pub struct ScrapeTask {
    pub actor: ActorRef,
    pub input_path: PathBuf,
}

/// Raw output of one successful scrape task, before source-specific parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeBatch {
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "actorName")]
    pub actor_name: String,
    #[serde(rename = "unparsed_jobs")]
    pub items: Vec<Value>,
}

/// A scrape task that failed; recorded and skipped, never retried this run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeFailure {
    pub input: String,
    pub error: String,
}

/// A normalized job posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub location: String,
    #[serde(rename = "jobUrl")]
    pub job_url: String,
    pub pay: String,
    #[serde(rename = "contractType")]
    pub contract_type: String,
    pub description: String,
    pub source: String,
}

/// Per-job output of the batch evaluator.
///
/// Scores are `None` when the model response did not parse; the composite
/// score exists only when both fit scores parsed.
#[derive(Debug, Clone, Serialize)]
pub struct MatchEvaluation {
    pub employer_fit: Option<f64>,
    pub candidate_fit: Option<f64>,
    pub composite_score: Option<i64>,
    pub rationale: String,
    pub generated_at: DateTime<Utc>,
}

impl MatchEvaluation {
    /// An evaluation with no scores and no rationale, used when a record's
    /// response is missing or unparseable at the JSON level.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            employer_fit: None,
            candidate_fit: None,
            composite_score: None,
            rationale: String::new(),
            generated_at,
        }
    }

    /// `round(employer_fit * candidate_fit / 100)`, defined only when both parsed.
    pub fn composite_of(employer_fit: Option<f64>, candidate_fit: Option<f64>) -> Option<i64> {
        match (employer_fit, candidate_fit) {
            (Some(e), Some(c)) => Some((e * c / 100.0).round() as i64),
            _ => None,
        }
    }
}

impl Job {
    /// Render one record-store row: columns map positionally to
    /// title, companyName, location, jobUrl, pay, contractType, source,
    /// compositeMatchScore, rationale, generatedAt.
    pub fn to_row(&self, eval: &MatchEvaluation) -> Vec<String> {
        vec![
            self.title.clone(),
            self.company_name.clone(),
            self.location.clone(),
            self.job_url.clone(),
            self.pay.clone(),
            self.contract_type.clone(),
            self.source.clone(),
            eval.composite_score
                .map(|s| s.to_string())
                .unwrap_or_default(),
            eval.rationale.clone(),
            eval.generated_at.to_rfc3339(),
        ]
    }
}

/// Batch job lifecycle status.
///
/// Terminal states are `Completed`, `Failed`, `Cancelled`, and `Expired`;
/// a job transitions only via polling and never leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl BatchStatus {
    /// Parse one of the six interface statuses.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Whether no further transition can occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired
        )
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// A bulk inference job as seen through the `BatchInference` seam.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub batch_id: String,
    pub status: BatchStatus,
    pub output_file_id: Option<String>,
    pub error_file_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_score_rounds_product_over_hundred() {
        assert_eq!(
            MatchEvaluation::composite_of(Some(80.0), Some(50.0)),
            Some(40)
        );
        assert_eq!(
            MatchEvaluation::composite_of(Some(80.0), Some(60.0)),
            Some(48)
        );
        // round, not truncate
        assert_eq!(
            MatchEvaluation::composite_of(Some(55.0), Some(55.0)),
            Some(30)
        );
        assert_eq!(MatchEvaluation::composite_of(Some(80.0), None), None);
        assert_eq!(MatchEvaluation::composite_of(None, None), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(BatchStatus::Completed.is_terminal());
        assert!(BatchStatus::Failed.is_terminal());
        assert!(BatchStatus::Cancelled.is_terminal());
        assert!(BatchStatus::Expired.is_terminal());
        assert!(!BatchStatus::Queued.is_terminal());
        assert!(!BatchStatus::InProgress.is_terminal());
    }

    #[test]
    fn status_parse_round_trips() {
        for s in ["queued", "in_progress", "completed", "failed", "cancelled", "expired"] {
            let parsed = BatchStatus::parse(s).unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert_eq!(BatchStatus::parse("finalizing"), None);
    }
}
