//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompletionError;

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
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

/// Body of a `chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub stream: bool,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Low-randomness request: temperature 0.2, top_p 1.0, no penalties.
    pub fn deterministic(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            stream: false,
            model: model.into(),
            temperature: 0.2,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            messages,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Port to a chat-completion service.
///
/// Returns the first choice's message content, untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError>;
}

/// Completion client speaking the OpenAI `chat/completions` protocol.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Create a client for `base_url`, which must end with `/`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, CompletionError> {
        let invalid = |reason: String| CompletionError::InvalidEndpoint {
            endpoint: base_url.to_string(),
            reason,
        };

        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| invalid(e.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("recommit/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(CompletionError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout_secs)
        } else {
            CompletionError::Transport(err)
        }
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        debug!("POST {} (model {})", self.endpoint, request.model);

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}

/// Extract `choices[0].message.content` from a response body.
pub fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::InvalidJson {
            reason: e.to_string(),
            body: body.to_string(),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| CompletionError::EmptyContent {
            body: body.to_string(),
        })
}
