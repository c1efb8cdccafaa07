//! Indeed item projection (curious_coder/indeed-scraper).

use serde_json::Value;

use crate::types::{Job, ScrapeBatch};

use super::{source_attribution, str_field, RawJobParser};

pub struct IndeedParser;

impl RawJobParser for IndeedParser {
    fn parse(&self, batch: &ScrapeBatch) -> Vec<Job> {
        batch
            .items
            .iter()
            .map(|item| Job {
                title: str_field(item, "displayTitle"),
                company_name: str_field(item, "company"),
                location: str_field(item, "jobLocationCity"),
                // The scraper occasionally emits a doubled slash after the host.
                job_url: str_field(item, "thirdPartyApplyUrl")
                    .replace("indeed.com//", "indeed.com/"),
                pay: item
                    .pointer("/salarySnippet/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                contract_type: item
                    .pointer("/jobTypes/0")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                description: str_field(item, "jobDescription"),
                source: source_attribution("Indeed", &batch.actor_id),
            })
            .collect()
    }
}
