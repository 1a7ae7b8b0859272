// Unit tests for talent-eval

use talent_eval::core::persist::select_best_match;
use talent_eval::core::{normalize, wave_count, OutputSchema, PromptBuilder, NOT_PROVIDED};
use talent_eval::models::{
    Candidate, CandidateStatus, InterviewAnswer, Job, JobMatch, JobStatus, Recommendation,
};
use talent_eval::services::StructuredPayload;
use talent_eval::{strip_json_fences, truncate_chars};

fn test_job(id: &str) -> Job {
    Job {
        id: id.to_string(),
        title: "Backend Engineer".to_string(),
        description: Some("Design and run our evaluation services.".to_string()),
        requirements: Some("Rust, PostgreSQL, 3+ years".to_string()),
        min_experience_years: Some(3),
        status: JobStatus::Open,
        created_at: None,
    }
}

fn test_candidate(id: &str, resume: Option<&str>) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: format!("Candidate {}", id),
        email: None,
        resume_text: resume.map(String::from),
        experience_years: Some(4),
        status: CandidateStatus::Active,
        ai_match_score: None,
        ai_match_analysis: None,
        job_id: None,
    }
}

#[test]
fn test_strip_fences_json_tag() {
    assert_eq!(
        strip_json_fences("```json\n{\"score\": 1}\n```"),
        "{\"score\": 1}"
    );
}

#[test]
fn test_strip_fences_bare() {
    assert_eq!(strip_json_fences("```\n{}\n```"), "{}");
}

#[test]
fn test_strip_fences_passthrough() {
    assert_eq!(strip_json_fences("  {\"a\": 1}  "), "{\"a\": 1}");
}

#[test]
fn test_truncate_chars_budget() {
    assert_eq!(truncate_chars("abcdef", 3), "abc");
    assert_eq!(truncate_chars("ab", 3), "ab");
    // Multi-byte characters count as one
    assert_eq!(truncate_chars("ééé", 2), "éé");
}

#[test]
fn test_wave_count_properties() {
    // 12 eligible entities at concurrency 5 run in 3 waves (5, 5, 2)
    assert_eq!(wave_count(12, 5), 3);
    assert_eq!(wave_count(5, 5), 1);
    assert_eq!(wave_count(6, 5), 2);
    assert_eq!(wave_count(0, 5), 0);
}

#[test]
fn test_prompt_uses_placeholder_for_missing_resume() {
    let builder = PromptBuilder::new(1500, 1000);
    let prompt = builder.job_candidate(&test_job("job-1"), &test_candidate("c-1", None));
    assert!(prompt.user.contains(NOT_PROVIDED));
}

#[test]
fn test_prompt_truncates_long_inputs() {
    let builder = PromptBuilder::new(100, 50);
    let long_resume = "r".repeat(5000);
    let prompt = builder.job_candidate(&test_job("job-1"), &test_candidate("c-1", Some(&long_resume)));
    assert!(prompt.user.contains(&"r".repeat(100)));
    assert!(!prompt.user.contains(&"r".repeat(101)));
}

#[test]
fn test_multi_job_prompt_lists_every_job() {
    let builder = PromptBuilder::new(1500, 1000);
    let jobs = vec![test_job("job-1"), test_job("job-2"), test_job("job-3")];
    let prompt = builder.candidate_jobs(&test_candidate("c-1", Some("Rust dev")), &jobs);

    for job in &jobs {
        assert!(prompt.user.contains(&job.id));
    }

    // Schema constrains job ids and carries the best-target selector
    let enum_ids = prompt.schema.parameters["properties"]["best_job_id"]["enum"]
        .as_array()
        .unwrap();
    assert_eq!(enum_ids.len(), 3);
}

#[test]
fn test_answer_prompt_includes_expected_answer_placeholder() {
    let builder = PromptBuilder::new(1500, 1000);
    let answer = InterviewAnswer {
        question: "What is ownership?".to_string(),
        expected_answer: None,
        answer_text: Some("Memory is owned by one binding at a time.".to_string()),
    };
    let prompt = builder.interview_answer(&answer);
    assert!(prompt.user.contains("What is ownership?"));
    assert!(prompt.user.contains(NOT_PROVIDED));
}

#[test]
fn test_schema_score_bounds_everywhere() {
    for schema in [
        OutputSchema::match_result(),
        OutputSchema::answer_evaluation(),
    ] {
        let props = schema.parameters["properties"].as_object().unwrap();
        for (_name, field) in props {
            if field["type"] == "integer" {
                assert_eq!(field["minimum"], 0);
                assert_eq!(field["maximum"], 100);
            }
        }
    }
}

#[test]
fn test_normalize_accepts_valid_result() {
    let payload = StructuredPayload::ToolCall(
        r#"{"match_score": 72, "skills_score": 68, "experience_score": 80,
            "recommendation": "recommended", "strengths": ["SQL"], "weaknesses": [],
            "summary": "Good fit"}"#
            .to_string(),
    );
    let result = normalize::match_result(&payload).unwrap();
    assert_eq!(result.match_score, 72);
    assert_eq!(result.recommendation, Recommendation::Recommended);
}

#[test]
fn test_normalize_rejects_out_of_range() {
    let payload = StructuredPayload::ToolCall(
        r#"{"match_score": 150, "recommendation": "recommended", "summary": ""}"#.to_string(),
    );
    assert!(normalize::match_result(&payload).is_err());
}

#[test]
fn test_normalize_rejects_unknown_recommendation() {
    let payload = StructuredPayload::ToolCall(
        r#"{"match_score": 50, "recommendation": "lukewarm", "summary": ""}"#.to_string(),
    );
    assert!(normalize::match_result(&payload).is_err());
}

#[test]
fn test_normalize_fenced_text_payload() {
    let payload = StructuredPayload::Text(
        "```json\n{\"match_score\": 64, \"recommendation\": \"consider\", \"summary\": \"ok\"}\n```"
            .to_string(),
    );
    let result = normalize::match_result(&payload).unwrap();
    assert_eq!(result.match_score, 64);
}

#[test]
fn test_best_match_selection() {
    let entry = |id: &str, score: i64| JobMatch {
        job_id: id.to_string(),
        match_score: score,
        recommendation: Recommendation::Consider,
        summary: String::new(),
    };

    let matches = vec![entry("job-a", 55), entry("job-b", 91), entry("job-c", 91)];
    // Highest score wins; first entry wins ties
    assert_eq!(select_best_match(&matches).unwrap().job_id, "job-b");
    assert!(select_best_match(&[]).is_none());
}
