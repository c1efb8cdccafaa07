//! Duplicate filtering against previously-seen records.
//!
//! Jobs are considered the same real-world posting when their normalized
//! (title, company, location) composite keys match, regardless of URL or
//! source site. This catches the same job listed on both ZipRecruiter and
//! Indeed under different URLs.

use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::info;

use crate::normalize::normalize;
use crate::types::Job;

/// Build the composite key for a job.
pub fn composite_key(job: &Job) -> String {
    format!(
        "{}_{}_{}",
        normalize(&job.title),
        normalize(&job.company_name),
        normalize(&job.location)
    )
}

/// Composite key for a raw store row; the first three columns are
/// positionally title, companyName, location. Missing columns are treated
/// as empty strings since rows come back as bare string arrays.
fn row_key(row: &[String]) -> String {
    let col = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
    format!(
        "{}_{}_{}",
        normalize(col(0)),
        normalize(col(1)),
        normalize(col(2))
    )
}

/// Filter `candidates` down to jobs not already present in `existing_rows`.
///
/// Candidates are first deduplicated among themselves through an
/// order-preserving map where the last occurrence of a key wins (the entry
/// keeps the position of its first occurrence). Jobs whose key appears in
/// the existing set are then dropped. Pure transform; the caller is
/// responsible for excluding any header row from `existing_rows`.
pub fn filter_new(existing_rows: &[Vec<String>], candidates: Vec<Job>) -> Vec<Job> {
    info!("Removing duplicate jobs...");

    let existing_keys: HashSet<String> = existing_rows.iter().map(|r| row_key(r)).collect();

    let mut by_key: IndexMap<String, Job> = IndexMap::new();
    for job in candidates {
        by_key.insert(composite_key(&job), job);
    }

    let unique: Vec<Job> = by_key
        .into_iter()
        .filter(|(key, _)| !existing_keys.contains(key))
        .map(|(_, job)| job)
        .collect();

    info!("{} jobs are new.", unique.len());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, company: &str, location: &str) -> Job {
        Job {
            title: title.into(),
            company_name: company.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    fn row(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filters_job_already_in_store_despite_location_suffix() {
        let existing = vec![row(&["Baker", "AcmeCo", "Los Angeles, CA", "https://a"])];
        let unique = filter_new(&existing, vec![job("Baker", "AcmeCo", "Los Angeles")]);
        assert!(unique.is_empty());
    }

    #[test]
    fn keeps_jobs_with_unseen_keys() {
        let existing = vec![row(&["Baker", "AcmeCo", "LA"])];
        let unique = filter_new(
            &existing,
            vec![job("Baker", "AcmeCo", "LA"), job("Chef", "AcmeCo", "LA")],
        );
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].title, "Chef");
    }

    #[test]
    fn last_occurrence_wins_within_batch() {
        let mut a = job("Baker", "AcmeCo", "LA");
        a.job_url = "https://first".into();
        let mut b = job("Baker", "AcmeCo", "LA");
        b.job_url = "https://second".into();

        let unique = filter_new(&[], vec![a, b]);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].job_url, "https://second");
    }

    #[test]
    fn within_batch_dedup_keeps_first_occurrence_position() {
        let unique = filter_new(
            &[],
            vec![
                job("Baker", "AcmeCo", "LA"),
                job("Chef", "AcmeCo", "LA"),
                job("Baker", "AcmeCo", "LA"),
            ],
        );
        let titles: Vec<_> = unique.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Baker", "Chef"]);
    }

    #[test]
    fn order_of_existing_rows_does_not_matter() {
        let rows = vec![
            row(&["Baker", "AcmeCo", "LA"]),
            row(&["Chef", "AcmeCo", "NY"]),
            row(&["Driver", "Initech", "SF"]),
        ];
        let candidates = || {
            vec![
                job("Baker", "AcmeCo", "LA"),
                job("Welder", "Initech", "SF"),
                job("Chef", "AcmeCo", "NY"),
            ]
        };

        let forward = filter_new(&rows, candidates());
        let mut reversed_rows = rows.clone();
        reversed_rows.reverse();
        let backward = filter_new(&reversed_rows, candidates());

        let titles = |jobs: &[Job]| jobs.iter().map(|j| j.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&forward), titles(&backward));
        assert_eq!(titles(&forward), vec!["Welder"]);
    }

    #[test]
    fn output_never_contains_existing_keys() {
        let rows = vec![row(&["Baker", "AcmeCo", "LA"]), row(&["Chef", "Org", "NY"])];
        let existing_keys: Vec<String> = rows.iter().map(|r| row_key(r)).collect();

        let unique = filter_new(
            &rows,
            vec![
                job("Baker", "AcmeCo", "LA"),
                job("Chef", "Org", "NY, NY"),
                job("Analyst", "Org", "NY"),
            ],
        );
        for j in &unique {
            assert!(!existing_keys.contains(&composite_key(j)));
        }
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn short_rows_use_empty_fragments() {
        let existing = vec![row(&["Baker"])];
        let unique = filter_new(&existing, vec![job("Baker", "", "")]);
        assert!(unique.is_empty());
    }
}
