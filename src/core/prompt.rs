use serde_json::{json, Value};

use crate::models::{Candidate, InterviewAnswer, Job, Recommendation};

/// Placeholder for source fields that are absent
///
/// Partial information degrades the prompt instead of blocking the
/// evaluation; the scoring service is told what is missing.
pub const NOT_PROVIDED: &str = "Not provided";

/// Output schema the scoring service must conform to
///
/// Rendered as an OpenAI-style function tool; `to_tool_choice` pins the
/// function so the service cannot answer with prose instead.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl OutputSchema {
    pub fn to_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }

    pub fn to_tool_choice(&self) -> Value {
        json!({
            "type": "function",
            "function": { "name": self.name }
        })
    }

    /// Schema for scoring one candidate against one job
    pub fn match_result() -> Self {
        Self {
            name: "submit_match_result",
            description: "Submit the structured evaluation of a candidate against a job",
            parameters: json!({
                "type": "object",
                "properties": {
                    "match_score": score_field("Overall fit of the candidate for the job"),
                    "skills_score": score_field("Alignment of the candidate's skills"),
                    "experience_score": score_field("Alignment of the candidate's experience"),
                    "recommendation": recommendation_field(),
                    "strengths": string_list_field("Candidate strengths for this job"),
                    "weaknesses": string_list_field("Candidate weaknesses for this job"),
                    "summary": { "type": "string", "description": "Two-sentence assessment" }
                },
                "required": ["match_score", "recommendation", "summary"]
            }),
        }
    }

    /// Schema for scoring one candidate against many jobs in a single call
    ///
    /// Array of per-job results plus a single best-target selector, so one
    /// call enforces structural correctness for all N jobs. `job_id` is
    /// constrained to the ids actually offered.
    pub fn job_matches(job_ids: &[String]) -> Self {
        Self {
            name: "submit_job_matches",
            description: "Submit the structured evaluation of a candidate against every listed job",
            parameters: json!({
                "type": "object",
                "properties": {
                    "matches": {
                        "type": "array",
                        "description": "One entry per listed job",
                        "items": {
                            "type": "object",
                            "properties": {
                                "job_id": { "type": "string", "enum": job_ids },
                                "match_score": score_field("Fit of the candidate for this job"),
                                "recommendation": recommendation_field(),
                                "summary": { "type": "string" }
                            },
                            "required": ["job_id", "match_score", "recommendation"]
                        }
                    },
                    "best_job_id": {
                        "type": "string",
                        "enum": job_ids,
                        "description": "The single best-fitting job for this candidate"
                    }
                },
                "required": ["matches", "best_job_id"]
            }),
        }
    }

    /// Schema for scoring one interview answer
    pub fn answer_evaluation() -> Self {
        Self {
            name: "submit_answer_evaluation",
            description: "Submit the structured evaluation of an interview answer",
            parameters: json!({
                "type": "object",
                "properties": {
                    "score": score_field("Correctness and completeness of the answer"),
                    "feedback": { "type": "string", "description": "One-paragraph feedback" }
                },
                "required": ["score"]
            }),
        }
    }
}

fn score_field(description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "maximum": 100,
        "description": description,
    })
}

fn recommendation_field() -> Value {
    json!({
        "type": "string",
        "enum": Recommendation::VALUES,
    })
}

fn string_list_field(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description,
    })
}

/// A fully built structured-inference request
#[derive(Debug, Clone)]
pub struct EvaluationPrompt {
    pub system: String,
    pub user: String,
    pub schema: OutputSchema,
}

/// Builds deterministic prompts within fixed character budgets
///
/// Long free-text inputs (resumes, job descriptions) are truncated to bound
/// prompt size and cost. Truncation is silent and lossy by design.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    resume_budget: usize,
    description_budget: usize,
}

impl PromptBuilder {
    pub fn new(resume_budget: usize, description_budget: usize) -> Self {
        Self {
            resume_budget,
            description_budget,
        }
    }

    /// Prompt for scoring one candidate against one job
    pub fn job_candidate(&self, job: &Job, candidate: &Candidate) -> EvaluationPrompt {
        let system = "You are a technical recruiter evaluating how well a candidate fits a job. \
                      Be consistent and critical; base every score only on the provided material."
            .to_string();

        let user = format!(
            "Evaluate the candidate below for the following job.\n\n\
             ## Job: {}\nDescription: {}\nRequirements: {}\nMinimum experience: {}\n\n\
             ## Candidate: {}\nExperience: {}\nResume:\n{}",
            job.title,
            self.truncated_or_placeholder(job.description.as_deref(), self.description_budget),
            self.truncated_or_placeholder(job.requirements.as_deref(), self.description_budget),
            job.min_experience_years
                .map(|y| format!("{} years", y))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            candidate.name,
            candidate
                .experience_years
                .map(|y| format!("{} years", y))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            self.truncated_or_placeholder(candidate.resume_text.as_deref(), self.resume_budget),
        );

        EvaluationPrompt {
            system,
            user,
            schema: OutputSchema::match_result(),
        }
    }

    /// Prompt for scoring one candidate against many jobs in a single call
    pub fn candidate_jobs(&self, candidate: &Candidate, jobs: &[Job]) -> EvaluationPrompt {
        let system = "You are a technical recruiter matching a candidate to open positions. \
                      Score every listed job and pick the single best fit."
            .to_string();

        let mut user = format!(
            "Match the candidate below against each of the listed jobs.\n\n\
             ## Candidate: {}\nExperience: {}\nResume:\n{}\n\n## Jobs\n",
            candidate.name,
            candidate
                .experience_years
                .map(|y| format!("{} years", y))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            self.truncated_or_placeholder(candidate.resume_text.as_deref(), self.resume_budget),
        );

        for job in jobs {
            user.push_str(&format!(
                "- id: {}\n  title: {}\n  description: {}\n",
                job.id,
                job.title,
                self.truncated_or_placeholder(job.description.as_deref(), self.description_budget),
            ));
        }

        let job_ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();

        EvaluationPrompt {
            system,
            user,
            schema: OutputSchema::job_matches(&job_ids),
        }
    }

    /// Prompt for scoring one interview answer
    pub fn interview_answer(&self, answer: &InterviewAnswer) -> EvaluationPrompt {
        let system = "You are grading an interview answer. Score correctness and completeness \
                      against the expected answer when one is given."
            .to_string();

        let user = format!(
            "## Question\n{}\n\n## Expected answer\n{}\n\n## Candidate answer\n{}",
            self.truncated_or_placeholder(Some(&answer.question), self.description_budget),
            self.truncated_or_placeholder(answer.expected_answer.as_deref(), self.description_budget),
            self.truncated_or_placeholder(answer.answer_text.as_deref(), self.resume_budget),
        );

        EvaluationPrompt {
            system,
            user,
            schema: OutputSchema::answer_evaluation(),
        }
    }

    fn truncated_or_placeholder(&self, text: Option<&str>, budget: usize) -> String {
        match text {
            Some(t) if !t.trim().is_empty() => truncate_chars(t, budget),
            _ => NOT_PROVIDED.to_string(),
        }
    }
}

/// Truncate to at most `budget` characters, respecting char boundaries
pub fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
