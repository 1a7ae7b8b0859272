use crate::models::{AnswerEvaluation, CandidateJobsAnalysis, JobMatch, MatchResult};
use crate::services::{StoreClient, StoreError};

/// Pick the highest-scoring job match; first entry wins on ties
///
/// The persister's selection is authoritative: the model also names a best
/// job, but the stored `job_id` always comes from the scores it returned.
pub fn select_best_match(matches: &[JobMatch]) -> Option<&JobMatch> {
    matches.iter().fold(None, |best, entry| match best {
        Some(b) if b.match_score >= entry.match_score => Some(b),
        _ => Some(entry),
    })
}

/// Persist a single job/candidate match result
///
/// Replaces the candidate's score/analysis fields wholesale: rerunning a
/// batch overwrites rather than duplicates.
pub async fn match_result(
    store: &StoreClient,
    candidate_id: &str,
    job_id: &str,
    result: &MatchResult,
) -> Result<(), StoreError> {
    let analysis = serde_json::json!({
        "jobId": job_id,
        "result": result,
    });

    store
        .upsert_candidate_scores(candidate_id, result.match_score, &analysis, None)
        .await
}

/// Persist a candidate-vs-jobs analysis
///
/// Writes the best match's score and job id alongside the full result set
/// for audit. Returns the chosen best job id.
pub async fn job_matches(
    store: &StoreClient,
    candidate_id: &str,
    analysis: &CandidateJobsAnalysis,
) -> Result<String, StoreError> {
    let best = select_best_match(&analysis.matches)
        .ok_or_else(|| StoreError::InvalidRecord("empty match set".to_string()))?;

    let best_job_id = best.job_id.clone();
    let best_score = best.match_score;

    let blob = serde_json::to_value(analysis)
        .map_err(|e| StoreError::InvalidRecord(format!("analysis not serializable: {}", e)))?;

    store
        .upsert_candidate_scores(candidate_id, best_score, &blob, Some(&best_job_id))
        .await?;

    Ok(best_job_id)
}

/// Persist one scored interview answer
pub async fn answer_evaluation(
    store: &StoreClient,
    interview_id: &str,
    answer_index: i32,
    evaluation: &AnswerEvaluation,
) -> Result<(), StoreError> {
    store
        .upsert_answer_score(
            interview_id,
            answer_index,
            evaluation.score,
            &evaluation.feedback,
        )
        .await
}
