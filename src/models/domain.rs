use serde::{Deserialize, Serialize};

/// Job posting with the fields needed to build an evaluation prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(rename = "minExperienceYears", default)]
    pub min_experience_years: Option<i32>,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Active,
    Draft,
    Paused,
    Closed,
}

impl JobStatus {
    /// Jobs a candidate can still be matched against
    pub fn is_open_for_matching(&self) -> bool {
        matches!(self, JobStatus::Open | JobStatus::Active | JobStatus::Draft)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Active => "active",
            JobStatus::Draft => "draft",
            JobStatus::Paused => "paused",
            JobStatus::Closed => "closed",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(JobStatus::Open),
            "active" => Ok(JobStatus::Active),
            "draft" => Ok(JobStatus::Draft),
            "paused" => Ok(JobStatus::Paused),
            "closed" => Ok(JobStatus::Closed),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// Candidate record as read from the store
///
/// The `ai_match_score` / `ai_match_analysis` / `job_id` fields are owned by
/// the evaluation pipeline; everything else is owned by the recruiting app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "resumeText", default)]
    pub resume_text: Option<String>,
    #[serde(rename = "experienceYears", default)]
    pub experience_years: Option<i32>,
    pub status: CandidateStatus,
    #[serde(rename = "aiMatchScore", default)]
    pub ai_match_score: Option<i64>,
    #[serde(rename = "aiMatchAnalysis", default)]
    pub ai_match_analysis: Option<serde_json::Value>,
    #[serde(rename = "jobId", default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Active,
    Hired,
    Archived,
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CandidateStatus::Active),
            "hired" => Ok(CandidateStatus::Hired),
            "archived" => Ok(CandidateStatus::Archived),
            other => Err(format!("unknown candidate status: {}", other)),
        }
    }
}

/// Interview session with the answers to be scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub status: InterviewStatus,
    #[serde(default)]
    pub answers: Vec<InterviewAnswer>,
    #[serde(rename = "aiScore", default)]
    pub ai_score: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Active,
    Completed,
    Expired,
}

impl std::str::FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(InterviewStatus::Active),
            "completed" => Ok(InterviewStatus::Completed),
            "expired" => Ok(InterviewStatus::Expired),
            other => Err(format!("unknown interview status: {}", other)),
        }
    }
}

/// One question/answer pair from an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewAnswer {
    pub question: String,
    #[serde(rename = "expectedAnswer", default)]
    pub expected_answer: Option<String>,
    #[serde(rename = "answerText", default)]
    pub answer_text: Option<String>,
}

/// Closed recommendation categories the scoring service must pick from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    HighlyRecommended,
    Recommended,
    Consider,
    NotRecommended,
}

impl Recommendation {
    pub const VALUES: [&'static str; 4] = [
        "highly_recommended",
        "recommended",
        "consider",
        "not_recommended",
    ];
}

/// Validated result of scoring one candidate against one job
///
/// Produced by the response normalizer, consumed by the persister, never
/// mutated afterwards. A rerun replaces the stored result wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "matchScore", alias = "match_score")]
    pub match_score: i64,
    #[serde(rename = "skillsScore", alias = "skills_score", default)]
    pub skills_score: Option<i64>,
    #[serde(rename = "experienceScore", alias = "experience_score", default)]
    pub experience_score: Option<i64>,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "evaluatedAt", default = "chrono::Utc::now")]
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

/// Per-job entry of a candidate-vs-jobs evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    #[serde(rename = "jobId", alias = "job_id")]
    pub job_id: String,
    #[serde(rename = "matchScore", alias = "match_score")]
    pub match_score: i64,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub summary: String,
}

/// Full output of scoring one candidate against many jobs in a single call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateJobsAnalysis {
    pub matches: Vec<JobMatch>,
    #[serde(rename = "bestJobId", alias = "best_job_id")]
    pub best_job_id: String,
    #[serde(rename = "evaluatedAt", default = "chrono::Utc::now")]
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

/// Scored interview answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub score: i64,
    #[serde(default)]
    pub feedback: String,
}
