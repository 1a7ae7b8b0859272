//! talent-eval - AI-powered candidate evaluation service for TalentFlow
//!
//! This library implements the batch evaluation pipeline: it builds
//! structured-inference requests for candidate/job pairs, calls an external
//! scoring service under a strict output schema, validates the results and
//! persists them with wave-based concurrency control.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    strip_json_fences, truncate_chars, BatchRunner, EvalError, OutputSchema, PromptBuilder,
};
pub use models::{
    Candidate, CandidateJobsAnalysis, Interview, Job, JobMatch, MatchResult, Recommendation,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(strip_json_fences("```json\n{}\n```"), "{}");
        assert_eq!(crate::core::wave_count(12, 5), 3);
    }
}
