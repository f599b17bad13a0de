//! Groq chat-completions backend (OpenAI-compatible API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{CompletionRequest, LlmBackend, LlmError};
use crate::utils::HttpClient;

/// Base URL of the Groq OpenAI-compatible API
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Environment variable holding the Groq credential
const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Longest slice of an error body kept in an error message
const MAX_ERROR_BODY: usize = 400;

/// Client for Groq chat completions
#[derive(Clone)]
pub struct GroqClient {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: String,
    model: String,
}

impl GroqClient {
    /// Create a client with the default model and endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Arc::new(HttpClient::new()), api_key)
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: GROQ_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build a client from `GROQ_API_KEY`, if it is set and non-blank
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Self::new)
    }

    /// Point the client at a different OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| snip(body, MAX_ERROR_BODY));
        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl LlmBackend for GroqClient {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        tracing::debug!(%url, model = %self.model, task = %request.task, "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Request(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

fn snip(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ===== Chat Completions API Types =====

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
