//! ZipRecruiter item projection (memo23/apify-ziprecruiter-scraper).

use crate::types::{Job, ScrapeBatch};

use super::{source_attribution, str_field, RawJobParser};

pub struct ZipRecruiterParser;

impl RawJobParser for ZipRecruiterParser {
    fn parse(&self, batch: &ScrapeBatch) -> Vec<Job> {
        batch
            .items
            .iter()
            .map(|item| Job {
                title: str_field(item, "Title"),
                company_name: str_field(item, "OrgName"),
                location: str_field(item, "City"),
                job_url: str_field(item, "Href"),
                pay: str_field(item, "FormattedSalaryShort"),
                contract_type: str_field(item, "EmploymentType"),
                description: str_field(item, "description"),
                source: source_attribution("ZipRecruiter", &batch.actor_id),
            })
            .collect()
    }
}
