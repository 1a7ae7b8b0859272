use serde::{Deserialize, Serialize};

use crate::models::domain::CandidateJobsAnalysis;

/// Per-item failure entry in a batch summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemError {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    pub message: String,
}

/// Aggregate outcome of one batch invocation
///
/// `success` stays true on partial failure: per-item errors are data, not a
/// protocol failure. Only zero successes (or a fatal condition before any item
/// ran) turns it false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummaryResponse {
    pub success: bool,
    pub total: usize,
    pub succeeded: usize,
    pub errors: Vec<ItemError>,
    #[serde(rename = "fatalError", skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<String>,
}

/// Response for the single-call candidate-vs-jobs evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvaluationResponse {
    pub success: bool,
    pub total: usize,
    pub succeeded: usize,
    pub errors: Vec<ItemError>,
    pub analysis: CandidateJobsAnalysis,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
