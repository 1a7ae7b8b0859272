// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AnswerEvaluation, Candidate, CandidateJobsAnalysis, CandidateStatus, Interview,
    InterviewAnswer, InterviewStatus, Job, JobMatch, JobStatus, MatchResult, Recommendation,
};
pub use requests::{EvaluateCandidateRequest, EvaluateInterviewRequest, EvaluateJobRequest};
pub use responses::{
    BatchSummaryResponse, CandidateEvaluationResponse, ErrorResponse, HealthResponse, ItemError,
};
