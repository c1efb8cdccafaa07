//! Parsing of the semi-structured batch output.
//!
//! The output artifact is newline-delimited JSON; each line carries a
//! correlation id and a free-text model response. The response text is run
//! through an ordered chain of parse strategies, first success wins:
//!
//! 1. strict `<number>,<number>,"<free text>"`
//! 2. lenient comma-split with defaulted scores
//! 3. whole text as rationale, no scores
//!
//! Results are assembled by correlation id, never by line order, since the
//! remote service does not guarantee output ordering.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

use openai_client::BatchOutputItem;

use crate::types::MatchEvaluation;

/// Correlation id for the record at `index`.
pub fn correlation_id(index: usize) -> String {
    format!("match-{}", index)
}

/// A parsed (or partially parsed) score line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLine {
    pub employer_fit: Option<f64>,
    pub candidate_fit: Option<f64>,
    pub rationale: String,
}

fn strict(raw: &str) -> Option<ScoreLine> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"^\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)\s*,\s*"(.*)"\s*$"#)
            .expect("valid strict score regex")
    });
    let caps = re.captures(raw)?;
    Some(ScoreLine {
        employer_fit: caps[1].parse().ok(),
        candidate_fit: caps[2].parse().ok(),
        rationale: caps[3].to_string(),
    })
}

fn lenient(raw: &str) -> Option<ScoreLine> {
    let tokens: Vec<&str> = raw.split(',').collect();
    let number = |i: usize| tokens.get(i).and_then(|t| t.trim().parse::<f64>().ok());

    let first = number(0);
    let second = number(1);
    if first.is_none() && second.is_none() {
        return None;
    }

    let rationale = if tokens.len() > 2 {
        strip_quotes(tokens[2..].join(",").trim()).to_string()
    } else {
        String::new()
    };

    Some(ScoreLine {
        employer_fit: Some(first.unwrap_or(0.0)),
        candidate_fit: Some(second.unwrap_or(0.0)),
        rationale,
    })
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Parse one free-text response through the strategy chain. Total: every
/// input yields a `ScoreLine`, in the worst case scoreless.
pub fn parse_score_line(raw: &str) -> ScoreLine {
    let strategies: [fn(&str) -> Option<ScoreLine>; 2] = [strict, lenient];
    for strategy in strategies {
        if let Some(line) = strategy(raw) {
            return line;
        }
    }
    ScoreLine {
        employer_fit: None,
        candidate_fit: None,
        rationale: raw.to_string(),
    }
}

/// Parse the whole output artifact into exactly `count` evaluations, in
/// input order. Lines that are not valid JSON are dropped with a warning;
/// records with no surviving line get an empty evaluation.
pub fn parse_batch_output(
    raw: &str,
    count: usize,
    generated_at: DateTime<Utc>,
) -> Vec<MatchEvaluation> {
    let mut by_id: HashMap<String, String> = HashMap::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<BatchOutputItem>(line) {
            Ok(item) => {
                let content = item
                    .response
                    .as_ref()
                    .and_then(|r| r.body.first_content())
                    .unwrap_or_default()
                    .to_string();
                by_id.insert(item.custom_id, content);
            }
            Err(e) => warn!(error = %e, "Dropping unparseable batch output line"),
        }
    }

    (0..count)
        .map(|index| match by_id.get(&correlation_id(index)) {
            Some(text) => {
                let line = parse_score_line(text);
                MatchEvaluation {
                    composite_score: MatchEvaluation::composite_of(
                        line.employer_fit,
                        line.candidate_fit,
                    ),
                    employer_fit: line.employer_fit,
                    candidate_fit: line.candidate_fit,
                    rationale: line.rationale,
                    generated_at,
                }
            }
            None => MatchEvaluation::empty(generated_at),
        })
        .collect()
}
