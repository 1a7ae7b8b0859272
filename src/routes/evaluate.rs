use actix_web::{web, HttpResponse, Responder};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::core::{batch, normalize, persist, BatchRunner, EvalError, EvaluationPrompt, PromptBuilder};
use crate::models::{
    BatchSummaryResponse, Candidate, CandidateEvaluationResponse, ErrorResponse,
    EvaluateCandidateRequest, EvaluateInterviewRequest, EvaluateJobRequest, HealthResponse,
    Interview, InterviewAnswer, InterviewStatus, Job,
};
use crate::services::{ChatMessage, InferenceClient, InferenceError, StoreClient, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub ai: Arc<InferenceClient>,
    pub runner: BatchRunner,
    pub prompts: PromptBuilder,
    pub interview_token_secret: String,
}

/// Configure all evaluation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/evaluate/job", web::post().to(evaluate_job_candidates))
        .route("/evaluate/candidate", web::post().to(evaluate_candidate_jobs))
        .route("/evaluate/interview", web::post().to(evaluate_interview));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Evaluate all eligible candidates against one job
///
/// POST /api/v1/evaluate/job
///
/// Request body:
/// ```json
/// { "jobId": "string" }
/// ```
///
/// Runs one scoring call per candidate in concurrency-bounded waves.
/// Per-item failures land in `errors[]`; the batch still reports success.
async fn evaluate_job_candidates(
    state: web::Data<AppState>,
    req: web::Json<EvaluateJobRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let job = match state.store.get_job(&req.job_id).await {
        Ok(job) => job,
        Err(StoreError::NotFound(what)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Job not found".to_string(),
                message: what,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch job {}: {}", req.job_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch job".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let candidates = match state.store.list_eligible_candidates().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to list candidates for job {}: {}", job.id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::info!(
        "Evaluating {} candidates against job {} ({})",
        candidates.len(),
        job.id,
        job.title
    );

    let units: Vec<(String, Candidate)> = candidates
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();

    let store = state.store.clone();
    let ai = state.ai.clone();
    let prompts = state.prompts;
    let job = Arc::new(job);

    let outcome = state
        .runner
        .run(units, move |candidate: Candidate| {
            let store = store.clone();
            let ai = ai.clone();
            let job = job.clone();
            async move { score_candidate_for_job(&store, &ai, prompts, &job, &candidate).await }
        })
        .await;

    summary_response(outcome)
}

/// Evaluate one candidate against all open jobs in a single structured call
///
/// POST /api/v1/evaluate/candidate
///
/// Request body:
/// ```json
/// { "candidateId": "string" }
/// ```
///
/// The response carries the full analysis in addition to the batch summary.
async fn evaluate_candidate_jobs(
    state: web::Data<AppState>,
    req: web::Json<EvaluateCandidateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let candidate = match state.store.get_candidate(&req.candidate_id).await {
        Ok(candidate) => candidate,
        Err(StoreError::NotFound(what)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Candidate not found".to_string(),
                message: what,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch candidate {}: {}", req.candidate_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch candidate".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let jobs = match state.store.list_open_jobs().await {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!("Failed to list open jobs: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list jobs".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    if jobs.is_empty() {
        return HttpResponse::Ok().json(BatchSummaryResponse {
            success: true,
            total: 0,
            succeeded: 0,
            errors: vec![],
            fatal_error: None,
        });
    }

    tracing::info!(
        "Evaluating candidate {} against {} open jobs",
        candidate.id,
        jobs.len()
    );

    let prompt = state.prompts.candidate_jobs(&candidate, &jobs);
    let payload = match complete_prompt(&state.ai, prompt).await {
        Ok(payload) => payload,
        Err(e) => return inference_error_response(e),
    };

    let job_ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
    let analysis = match normalize::candidate_jobs_analysis(&payload, &job_ids) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!("Malformed analysis for candidate {}: {}", candidate.id, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Malformed scoring response".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    let best_job_id = match persist::job_matches(&state.store, &candidate.id, &analysis).await {
        Ok(best) => best,
        Err(e) => {
            tracing::error!("Failed to persist analysis for {}: {}", candidate.id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to persist analysis".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::info!("Candidate {} best match: {}", candidate.id, best_job_id);

    HttpResponse::Ok().json(CandidateEvaluationResponse {
        success: true,
        total: jobs.len(),
        succeeded: analysis.matches.len(),
        errors: vec![],
        analysis,
    })
}

/// Score every answer of an interview session
///
/// POST /api/v1/evaluate/interview
///
/// Request body:
/// ```json
/// { "sessionToken": "string" }
/// ```
async fn evaluate_interview(
    state: web::Data<AppState>,
    req: web::Json<EvaluateInterviewRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if state.interview_token_secret.is_empty() {
        tracing::error!("Interview token secret is not configured");
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Server misconfigured".to_string(),
            message: "interview token secret is not configured".to_string(),
            status_code: 500,
        });
    }

    let interview_id =
        match decode_interview_token(&req.session_token, &state.interview_token_secret) {
            Ok(id) => id,
            Err(e) => {
                tracing::info!("Rejected interview token: {}", e);
                return HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "Invalid session token".to_string(),
                    message: e.to_string(),
                    status_code: 401,
                });
            }
        };

    let interview = match state.store.get_interview(&interview_id).await {
        Ok(interview) => interview,
        Err(StoreError::NotFound(what)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Interview not found".to_string(),
                message: what,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch interview {}: {}", interview_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch interview".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    if interview.status != InterviewStatus::Active {
        return HttpResponse::Unauthorized().json(ErrorResponse {
            error: "Interview not active".to_string(),
            message: format!("interview {} is no longer active", interview.id),
            status_code: 401,
        });
    }

    tracing::info!(
        "Scoring {} answers for interview {} (candidate {})",
        interview.answers.len(),
        interview.id,
        interview.candidate_id
    );

    let Interview { id, answers, .. } = interview;

    let units: Vec<(String, (i32, InterviewAnswer))> = answers
        .into_iter()
        .enumerate()
        .map(|(idx, answer)| (format!("answer-{}", idx), (idx as i32, answer)))
        .collect();

    let store = state.store.clone();
    let ai = state.ai.clone();
    let prompts = state.prompts;
    let interview_id = Arc::new(id);

    let scoring_id = interview_id.clone();
    let outcome = state
        .runner
        .run(units, move |(idx, answer): (i32, InterviewAnswer)| {
            let store = store.clone();
            let ai = ai.clone();
            let interview_id = scoring_id.clone();
            async move { score_interview_answer(&store, &ai, prompts, &interview_id, idx, &answer).await }
        })
        .await;

    if outcome.succeeded > 0 {
        match state.store.finalize_interview_score(&interview_id).await {
            Ok(Some(score)) => {
                tracing::info!("Interview {} overall score: {}", interview_id, score)
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to finalize interview {} score: {}", interview_id, e)
            }
        }
    }

    summary_response(outcome)
}

/// One evaluation item: prompt, score, normalize, persist
async fn score_candidate_for_job(
    store: &StoreClient,
    ai: &InferenceClient,
    prompts: PromptBuilder,
    job: &Job,
    candidate: &Candidate,
) -> Result<(), EvalError> {
    let prompt = prompts.job_candidate(job, candidate);
    let payload = complete_prompt(ai, prompt).await?;
    let result = normalize::match_result(&payload)?;
    persist::match_result(store, &candidate.id, &job.id, &result).await?;

    tracing::debug!(
        "Candidate {} scored {} for job {} ({:?})",
        candidate.id,
        result.match_score,
        job.id,
        result.recommendation
    );

    Ok(())
}

async fn score_interview_answer(
    store: &StoreClient,
    ai: &InferenceClient,
    prompts: PromptBuilder,
    interview_id: &str,
    answer_index: i32,
    answer: &InterviewAnswer,
) -> Result<(), EvalError> {
    let prompt = prompts.interview_answer(answer);
    let payload = complete_prompt(ai, prompt).await?;
    let evaluation = normalize::answer_evaluation(&payload)?;
    persist::answer_evaluation(store, interview_id, answer_index, &evaluation).await?;

    Ok(())
}

async fn complete_prompt(
    ai: &InferenceClient,
    prompt: EvaluationPrompt,
) -> Result<crate::services::StructuredPayload, InferenceError> {
    let EvaluationPrompt {
        system,
        user,
        schema,
    } = prompt;

    ai.complete(
        vec![ChatMessage::system(system), ChatMessage::user(user)],
        Some(&schema),
    )
    .await
}

/// Map a scoring-service failure from the single-call path to HTTP
fn inference_error_response(e: InferenceError) -> HttpResponse {
    use actix_web::http::StatusCode;

    let (status, error) = match &e {
        InferenceError::QuotaExhausted => (StatusCode::PAYMENT_REQUIRED, "Quota exhausted"),
        InferenceError::Configuration => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Server misconfigured")
        }
        InferenceError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Rate limited"),
        _ => (StatusCode::BAD_GATEWAY, "Scoring service error"),
    };

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: e.to_string(),
        status_code: status.as_u16(),
    })
}

/// Map a finished batch to its HTTP response
///
/// 200 for any batch that ran, even with partial failures. Only a fatal
/// condition with zero successes turns into a non-200.
fn summary_response(outcome: batch::BatchOutcome) -> HttpResponse {
    match &outcome.fatal {
        Some(EvalError::Inference(InferenceError::QuotaExhausted)) if outcome.succeeded == 0 => {
            HttpResponse::PaymentRequired().json(ErrorResponse {
                error: "Quota exhausted".to_string(),
                message: "scoring service quota exhausted before any item succeeded".to_string(),
                status_code: 402,
            })
        }
        Some(EvalError::Inference(InferenceError::Configuration)) => {
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Server misconfigured".to_string(),
                message: "scoring service credential is not configured".to_string(),
                status_code: 500,
            })
        }
        _ => HttpResponse::Ok().json(outcome.into_summary()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct InterviewClaims {
    /// Interview id
    sub: String,
    exp: usize,
}

/// Resolve a signed session token to an interview id
fn decode_interview_token(token: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let data = decode::<InterviewClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims.sub)
}
