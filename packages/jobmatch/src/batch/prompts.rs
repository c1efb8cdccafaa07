//! Prompt construction for the match evaluator.

use crate::types::Job;

/// Build the evaluation prompt for one job.
///
/// The model is asked for a single line in the exact shape
/// `employer_fit,candidate_fit,"rationale"`, which the response parser
/// consumes. Both scores are 0-100: employer fit grades the candidate
/// against the job's requirements, candidate fit grades the job against
/// the candidate's stated preferences.
pub fn evaluation_prompt(job: &Job, candidate_summary: &str) -> String {
    let job_json = serde_json::to_string(job).unwrap_or_default();
    format!(
        r#"Job Match Evaluation Prompt:

    [ROLE] Job Match Evaluator
    [TASK] Assess the compatibility between the job and the candidate from both sides:
        - employer_fit: how well the candidate's skills and experience satisfy the job's requirements (0-100)
        - candidate_fit: how well the job satisfies the candidate's preferences for role, pay, and location (0-100)
    [RULES]
    - Analyze the following:
      - JOB: {job_json}
      - CANDIDATE: {candidate_summary}
    - OUTPUT EXACTLY ONE LINE: employer_fit,candidate_fit,"rationale"
    - The two scores are plain numbers with NO extra text or symbols.
    - The rationale is a double-quoted string under 250 characters, NO Markdown.

    RESPONSE:"#
    )
}
