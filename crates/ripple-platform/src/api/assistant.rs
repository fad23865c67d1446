//! Recipe Assistant Endpoint
//!
//! Relays a question to an OpenAI-compatible chat-completions API with
//! a fixed recipe-assistant system prompt and returns the answer text.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::api::common::ApiResult;
use crate::error::PlatformError;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const SYSTEM_PROMPT: &str = "You are an assistant that provides recipe suggestions.";

/// Assistant relay state
#[derive(Clone)]
pub struct AssistantState {
    pub http: reqwest::Client,
    pub api_key: String,
    pub model: String,
}

impl AssistantState {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Relay a recipe question upstream
pub async fn ask(
    State(state): State<AssistantState>,
    Json(req): Json<AskRequest>,
) -> ApiResult<AskResponse> {
    if req.question.is_empty() {
        return Err(PlatformError::validation("Question is required"));
    }

    let body = json!({
        "model": state.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": req.question },
        ],
        "temperature": 0.7,
    });

    let response = state
        .http
        .post(COMPLETIONS_URL)
        .bearer_auth(&state.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| PlatformError::internal(format!("assistant request failed: {e}")))?;

    if !response.status().is_success() {
        error!(status = %response.status(), "assistant upstream rejected request");
        return Err(PlatformError::internal("assistant upstream error"));
    }

    let completion: Completion = response
        .json()
        .await
        .map_err(|e| PlatformError::internal(format!("malformed assistant response: {e}")))?;

    let answer = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| PlatformError::internal("assistant returned no choices"))?;

    Ok(Json(AskResponse { answer }))
}

/// Create the assistant router
pub fn assistant_router(state: AssistantState) -> Router {
    Router::new().route("/chatgpt", post(ask)).with_state(state)
}
