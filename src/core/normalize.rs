use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{AnswerEvaluation, CandidateJobsAnalysis, MatchResult};
use crate::services::StructuredPayload;

/// Errors raised while turning a raw payload into a validated result
///
/// Always a per-item failure; the batch continues.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed response: {field} is {value}, expected 0-100")]
    ScoreOutOfRange { field: &'static str, value: i64 },

    #[error("malformed response: best job id {0} is not among the evaluated jobs")]
    UnknownBestJob(String),

    #[error("malformed response: duplicate entry for job {0}")]
    DuplicateJobEntry(String),

    #[error("malformed response: empty result set")]
    EmptyResultSet,
}

/// Extract the JSON text from a structured payload
///
/// Tool-call arguments are already a JSON document. Free-text content may be
/// wrapped in markdown code fences, which some models add despite
/// instructions; strip them before parsing.
pub fn payload_json(payload: &StructuredPayload) -> &str {
    match payload {
        StructuredPayload::ToolCall(arguments) => arguments,
        StructuredPayload::Text(content) => strip_json_fences(content),
    }
}

/// Strips ```json ... ``` or ``` ... ``` fences from model output
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim_start())
    } else {
        text
    }
}

fn parse<T: DeserializeOwned>(payload: &StructuredPayload) -> Result<T, NormalizeError> {
    Ok(serde_json::from_str(payload_json(payload))?)
}

/// Reject scores outside the declared 0-100 bounds
///
/// An explicit out-of-range value is a data-quality failure, not a
/// correction opportunity: it is rejected, never clamped.
fn check_score(field: &'static str, value: i64) -> Result<(), NormalizeError> {
    if !(0..=100).contains(&value) {
        return Err(NormalizeError::ScoreOutOfRange { field, value });
    }
    Ok(())
}

/// Parse and validate a single job/candidate match result
pub fn match_result(payload: &StructuredPayload) -> Result<MatchResult, NormalizeError> {
    let result: MatchResult = parse(payload)?;

    check_score("match_score", result.match_score)?;
    if let Some(score) = result.skills_score {
        check_score("skills_score", score)?;
    }
    if let Some(score) = result.experience_score {
        check_score("experience_score", score)?;
    }

    Ok(result)
}

/// Parse and validate a candidate-vs-jobs analysis
///
/// Every per-job score is bounds-checked, and both the per-job ids and the
/// best-job selector must reference jobs that were actually offered for
/// evaluation, each at most once. Anything else is schema drift.
pub fn candidate_jobs_analysis(
    payload: &StructuredPayload,
    known_job_ids: &[String],
) -> Result<CandidateJobsAnalysis, NormalizeError> {
    let analysis: CandidateJobsAnalysis = parse(payload)?;

    if analysis.matches.is_empty() {
        return Err(NormalizeError::EmptyResultSet);
    }

    let mut seen = std::collections::HashSet::new();
    for entry in &analysis.matches {
        check_score("match_score", entry.match_score)?;
        if !known_job_ids.contains(&entry.job_id) {
            return Err(NormalizeError::UnknownBestJob(entry.job_id.clone()));
        }
        if !seen.insert(entry.job_id.as_str()) {
            return Err(NormalizeError::DuplicateJobEntry(entry.job_id.clone()));
        }
    }

    if !known_job_ids.contains(&analysis.best_job_id) {
        return Err(NormalizeError::UnknownBestJob(analysis.best_job_id.clone()));
    }

    Ok(analysis)
}

/// Parse and validate an interview answer evaluation
pub fn answer_evaluation(payload: &StructuredPayload) -> Result<AnswerEvaluation, NormalizeError> {
    let evaluation: AnswerEvaluation = parse(payload)?;
    check_score("score", evaluation.score)?;
    Ok(evaluation)
}
