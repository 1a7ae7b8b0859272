use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AiSettings;
use crate::core::prompt::OutputSchema;

/// Errors that can occur when calling the external scoring service
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Missing credential. Fatal before any call is attempted.
    #[error("scoring service credential is not configured")]
    Configuration,

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 429. Reported per item; the scheduler does not retry.
    #[error("scoring service rate limited the request")]
    RateLimited,

    /// HTTP 402. Fatal for the whole batch.
    #[error("scoring service quota exhausted")]
    QuotaExhausted,

    #[error("scoring service error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("scoring service returned no usable content")]
    EmptyResponse,
}

impl InferenceError {
    /// True for failures that must stop the whole batch rather than one item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InferenceError::Configuration | InferenceError::QuotaExhausted
        )
    }
}

/// The raw structured payload as returned by the scoring service
///
/// The service replies either with a function-call whose arguments conform to
/// the requested schema, or with free text that may wrap JSON in markdown
/// fences. The variant is resolved once here so downstream code only deals
/// with one shape.
#[derive(Debug, Clone)]
pub enum StructuredPayload {
    /// `tool_calls[0].function.arguments` — already a JSON document
    ToolCall(String),
    /// Free-text `content`, possibly fence-wrapped
    Text(String),
}

/// One chat message in the scoring request
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

/// Client for the external scoring service
///
/// Performs exactly one network call per invocation. Batching, pacing and
/// failure isolation live in the batch scheduler, not here.
#[derive(Debug)]
pub struct InferenceClient {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl InferenceClient {
    /// Create a new client, failing fast when the credential is missing
    pub fn new(settings: &AiSettings) -> Result<Self, InferenceError> {
        if settings.api_key.trim().is_empty() {
            return Err(InferenceError::Configuration);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            client,
        })
    }

    /// Send one structured-inference request
    ///
    /// When a schema is given, the service is forced to answer through a
    /// function call conforming to it (`tool_choice` pins the function), so a
    /// single call enforces structural correctness for the whole payload.
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        schema: Option<&OutputSchema>,
    ) -> Result<StructuredPayload, InferenceError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });

        if let Some(schema) = schema {
            body["tools"] = serde_json::json!([schema.to_tool()]);
            body["tool_choice"] = schema.to_tool_choice();
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            429 => return Err(InferenceError::RateLimited),
            402 => return Err(InferenceError::QuotaExhausted),
            s if !status.is_success() => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unable to read body".to_string());
                tracing::warn!("Scoring service returned {}: {}", s, message);
                return Err(InferenceError::Upstream { status: s, message });
            }
            _ => {}
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(InferenceError::Transport)?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(InferenceError::EmptyResponse)?;

        if let Some(call) = message.tool_calls.and_then(|mut calls| {
            if calls.is_empty() {
                None
            } else {
                Some(calls.remove(0))
            }
        }) {
            return Ok(StructuredPayload::ToolCall(call.function.arguments));
        }

        match message.content {
            Some(content) if !content.trim().is_empty() => Ok(StructuredPayload::Text(content)),
            _ => Err(InferenceError::EmptyResponse),
        }
    }
}
