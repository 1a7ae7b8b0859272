use criterion::{black_box, criterion_group, criterion_main, Criterion};

use talent_eval::models::{Candidate, CandidateStatus, Job, JobStatus};
use talent_eval::services::StructuredPayload;
use talent_eval::{core::normalize, strip_json_fences, PromptBuilder};

fn sample_job(id: &str) -> Job {
    Job {
        id: id.to_string(),
        title: "Backend Engineer".to_string(),
        description: Some("Design, build and operate evaluation services. ".repeat(20)),
        requirements: Some("Rust, PostgreSQL, distributed systems".to_string()),
        min_experience_years: Some(3),
        status: JobStatus::Open,
        created_at: None,
    }
}

fn sample_candidate() -> Candidate {
    Candidate {
        id: "cand-1".to_string(),
        name: "Alex Doe".to_string(),
        email: None,
        resume_text: Some("Senior engineer with Rust and SQL experience. ".repeat(60)),
        experience_years: Some(6),
        status: CandidateStatus::Active,
        ai_match_score: None,
        ai_match_analysis: None,
        job_id: None,
    }
}

fn bench_prompt_building(c: &mut Criterion) {
    let builder = PromptBuilder::new(1500, 1000);
    let job = sample_job("job-1");
    let candidate = sample_candidate();

    c.bench_function("prompt_job_candidate", |b| {
        b.iter(|| builder.job_candidate(black_box(&job), black_box(&candidate)))
    });

    let jobs: Vec<Job> = (0..10).map(|i| sample_job(&format!("job-{}", i))).collect();
    c.bench_function("prompt_candidate_jobs_10", |b| {
        b.iter(|| builder.candidate_jobs(black_box(&candidate), black_box(&jobs)))
    });
}

fn bench_fence_stripping(c: &mut Criterion) {
    let fenced = format!("```json\n{}\n```", "{\"match_score\": 80}".repeat(50));
    c.bench_function("strip_json_fences", |b| {
        b.iter(|| strip_json_fences(black_box(&fenced)))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let payload = StructuredPayload::ToolCall(
        r#"{"match_score": 82, "skills_score": 75, "experience_score": 88,
            "recommendation": "recommended",
            "strengths": ["Rust", "SQL", "systems design"],
            "weaknesses": ["limited frontend exposure"],
            "summary": "Strong backend candidate with relevant experience."}"#
            .to_string(),
    );

    c.bench_function("normalize_match_result", |b| {
        b.iter(|| normalize::match_result(black_box(&payload)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_prompt_building,
    bench_fence_stripping,
    bench_normalize
);
criterion_main!(benches);
