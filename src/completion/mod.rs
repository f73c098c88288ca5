#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ConfigError, EndpointConfig};
use crate::prompt::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Body of a non-streaming chat completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
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

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("API key not set (expected in environment variable {0})")]
    MissingApiKey(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Authentication failed: HTTP {0}")]
    Unauthorized(u16),
    #[error("Rate limit exceeded: HTTP 429")]
    RateLimited,
    #[error("Endpoint returned HTTP {0}")]
    Status(u16),
    #[error("Failed to encode request: {0}")]
    InvalidRequest(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Response contained no completion text")]
    EmptyResponse,
}

impl From<ureq::Error> for EndpointError {
    #[inline]
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::StatusCode(status @ (401 | 403)) => Self::Unauthorized(status),
            ureq::Error::StatusCode(429) => Self::RateLimited,
            ureq::Error::StatusCode(status) => Self::Status(status),
            ureq::Error::Timeout(_) => Self::Timeout,
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Anything that can turn a message list into a single completion
pub trait CompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError>;
}

impl<T: CompletionClient + ?Sized> CompletionClient for &T {
    #[inline]
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError> {
        (**self).complete(request)
    }
}

impl<T: CompletionClient + ?Sized> CompletionClient for Box<T> {
    #[inline]
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError> {
        (**self).complete(request)
    }
}

/// Blocking client for OpenAI-compatible `/chat/completions` endpoints
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    completions_url: Url,
    api_key: Option<String>,
    api_key_env: String,
    agent: ureq::Agent,
}

impl HttpCompletionClient {
    /// Build a client for `config`. Without `api_key` every call fails with
    /// [`EndpointError::MissingApiKey`].
    #[inline]
    pub fn new(config: &EndpointConfig, api_key: Option<String>) -> Result<Self, ConfigError> {
        let completions_url = config.completions_url()?;

        Ok(Self {
            completions_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
            agent: build_agent(Duration::from_secs(config.timeout_seconds)),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[inline]
    pub fn completions_url(&self) -> &Url {
        &self.completions_url
    }

    #[inline]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EndpointError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EndpointError::MissingApiKey(self.api_key_env.clone()))?;

        let request_json = serde_json::to_string(request)
            .map_err(|e| EndpointError::InvalidRequest(e.to_string()))?;

        debug!(
            "Requesting completion from {} (model: {}, {} messages)",
            self.completions_url,
            request.model,
            request.messages.len()
        );

        let response_text = self
            .agent
            .post(self.completions_url.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {api_key}"))
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                let error = EndpointError::from(e);
                warn!("Completion request failed: {}", error);
                error
            })?;

        let content = parse_completion(&response_text)?;
        debug!("Received completion (length: {})", content.len());
        Ok(content)
    }
}

/// Text of the first choice, verbatim
fn parse_completion(body: &str) -> Result<String, EndpointError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| EndpointError::MalformedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(EndpointError::EmptyResponse)
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}
