// Integration tests for talent-eval
//
// The scoring service is mocked with mockito; the batch runner is exercised
// with in-memory operations so no database is required.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use talent_eval::config::AiSettings;
use talent_eval::core::{normalize, BatchRunner, EvalError};
use talent_eval::services::{ChatMessage, InferenceClient, InferenceError, StructuredPayload};

fn ai_settings(endpoint: &str) -> AiSettings {
    AiSettings {
        endpoint: endpoint.to_string(),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        temperature: 0.3,
        timeout_secs: 5,
    }
}

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a recruiter."),
        ChatMessage::user("Evaluate this candidate."),
    ]
}

#[tokio::test]
async fn test_tool_call_payload_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let body = serde_json::json!({
        "choices": [{
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "submit_match_result",
                        "arguments": "{\"match_score\": 88, \"skills_score\": 90, \"recommendation\": \"highly_recommended\", \"summary\": \"Excellent\"}"
                    }
                }]
            }
        }]
    });
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = InferenceClient::new(&ai_settings(&server.url())).unwrap();
    let payload = client.complete(messages(), None).await.unwrap();

    assert!(matches!(payload, StructuredPayload::ToolCall(_)));
    let result = normalize::match_result(&payload).unwrap();
    assert_eq!(result.match_score, 88);
    assert_eq!(result.skills_score, Some(90));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fenced_text_payload_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let content = "```json\n{\"match_score\": 61, \"recommendation\": \"consider\", \"summary\": \"Average\"}\n```";
    let body = serde_json::json!({
        "choices": [{ "message": { "content": content } }]
    });
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = InferenceClient::new(&ai_settings(&server.url())).unwrap();
    let payload = client.complete(messages(), None).await.unwrap();

    assert!(matches!(payload, StructuredPayload::Text(_)));
    let result = normalize::match_result(&payload).unwrap();
    assert_eq!(result.match_score, 61);
}

#[tokio::test]
async fn test_rate_limit_and_quota_classification() {
    let mut server = mockito::Server::new_async().await;

    let rate_limited = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let client = InferenceClient::new(&ai_settings(&server.url())).unwrap();
    let err = client.complete(messages(), None).await.unwrap_err();
    assert!(matches!(err, InferenceError::RateLimited));
    assert!(!err.is_fatal());
    rate_limited.remove_async().await;

    server
        .mock("POST", "/v1/chat/completions")
        .with_status(402)
        .with_body("payment required")
        .create_async()
        .await;

    let err = client.complete(messages(), None).await.unwrap_err();
    assert!(matches!(err, InferenceError::QuotaExhausted));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_upstream_error_classification() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = InferenceClient::new(&ai_settings(&server.url())).unwrap();
    let err = client.complete(messages(), None).await.unwrap_err();
    assert!(matches!(err, InferenceError::Upstream { status: 500, .. }));
}

#[tokio::test]
async fn test_empty_choices_is_empty_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"choices\": []}")
        .create_async()
        .await;

    let client = InferenceClient::new(&ai_settings(&server.url())).unwrap();
    let err = client.complete(messages(), None).await.unwrap_err();
    assert!(matches!(err, InferenceError::EmptyResponse));
}

fn unit_ids(n: usize) -> Vec<(String, usize)> {
    (0..n).map(|i| (format!("c-{}", i), i)).collect()
}

#[tokio::test]
async fn test_batch_respects_concurrency_limit() {
    let runner = BatchRunner::new(5, Duration::ZERO);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let in_flight_op = in_flight.clone();
    let max_op = max_in_flight.clone();
    let outcome = runner
        .run(unit_ids(12), move |_i| {
            let in_flight = in_flight_op.clone();
            let max = max_op.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

    assert_eq!(outcome.total, 12);
    assert_eq!(outcome.succeeded, 12);
    assert!(outcome.errors.is_empty());
    // Never more than one wave's worth of items in flight
    assert!(max_in_flight.load(Ordering::SeqCst) <= 5);
}

#[tokio::test]
async fn test_batch_isolates_per_item_failures() {
    let runner = BatchRunner::new(5, Duration::ZERO);

    // Items 3 and 7 fail with an upstream error; the rest succeed
    let outcome = runner
        .run(unit_ids(12), |i| async move {
            if i == 3 || i == 7 {
                Err(EvalError::Inference(InferenceError::Upstream {
                    status: 500,
                    message: "boom".to_string(),
                }))
            } else {
                Ok(())
            }
        })
        .await;

    assert_eq!(outcome.total, 12);
    assert_eq!(outcome.succeeded, 10);
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.fatal.is_none());
    assert!(outcome.is_success());

    let summary = outcome.into_summary();
    assert!(summary.success);
    let mut failed: Vec<&str> = summary.errors.iter().map(|e| e.subject_id.as_str()).collect();
    failed.sort();
    assert_eq!(failed, vec!["c-3", "c-7"]);
}

#[tokio::test]
async fn test_quota_exhaustion_stops_later_waves() {
    let runner = BatchRunner::new(5, Duration::ZERO);
    let started = Arc::new(AtomicUsize::new(0));

    let started_op = started.clone();
    let outcome = runner
        .run(unit_ids(12), move |i| {
            let started = started_op.clone();
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                // Item 2 (wave 1) hits the quota wall
                if i == 2 {
                    Err(EvalError::Inference(InferenceError::QuotaExhausted))
                } else {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(())
                }
            }
        })
        .await;

    // Only the first wave ran; its other items still completed and counted
    assert_eq!(started.load(Ordering::SeqCst), 5);
    assert_eq!(outcome.total, 12);
    assert_eq!(outcome.succeeded, 4);
    assert!(outcome.fatal.is_some());
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.subject_id == "c-2" && e.message.contains("quota")));
}

#[tokio::test]
async fn test_zero_eligible_entities_short_circuits() {
    let runner = BatchRunner::new(5, Duration::from_secs(1));
    let outcome = runner
        .run(Vec::<(String, usize)>::new(), |_| async { Ok(()) })
        .await;

    assert_eq!(outcome.total, 0);
    assert_eq!(outcome.succeeded, 0);
    assert!(outcome.errors.is_empty());
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_rerun_replaces_rather_than_duplicates() {
    // Idempotency at the aggregate level: the same inputs produce the same
    // outcome shape on a rerun, with results keyed by subject id
    let runner = BatchRunner::new(5, Duration::ZERO);
    let writes = Arc::new(std::sync::Mutex::new(
        std::collections::HashMap::<String, usize>::new(),
    ));

    for run in 0..2 {
        let writes_op = writes.clone();
        let outcome = runner
            .run(unit_ids(4), move |i| {
                let writes = writes_op.clone();
                async move {
                    writes.lock().unwrap().insert(format!("c-{}", i), run);
                    Ok(())
                }
            })
            .await;
        assert_eq!(outcome.succeeded, 4);
    }

    let writes = writes.lock().unwrap();
    // Four keys, each holding the value of the latest run
    assert_eq!(writes.len(), 4);
    assert!(writes.values().all(|&v| v == 1));
}
