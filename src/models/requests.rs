use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to evaluate all eligible candidates against one job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateJobRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "job_id", rename = "jobId")]
    pub job_id: String,
}

/// Request to evaluate one candidate against all open jobs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateCandidateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_id", rename = "candidateId")]
    pub candidate_id: String,
}

/// Request to score the answers of an interview session
///
/// The token is a signed session token issued when the interview was started,
/// not a raw interview id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateInterviewRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "session_token", rename = "sessionToken")]
    pub session_token: String,
}
