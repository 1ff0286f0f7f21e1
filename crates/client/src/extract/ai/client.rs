//! Chat-completions client for the AI extraction strategy.
//!
//! ### Specification
//!
//! - **Endpoint**: `POST <base_url>/chat/completions`
//! - **Authentication**: `Authorization: Bearer <key>`
//! - **Request**: `{model, messages: [{role: "user", content}],
//!   temperature, max_tokens}`
//! - **Response**: the model's raw text at `choices[0].message.content`;
//!   downstream parsing of that text lives in the extractor, not here.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use persona_core::Error;

/// Default chat-completions base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model name.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature; extraction wants near-deterministic output.
const TEMPERATURE: f32 = 0.1;

/// Completion budget for one extraction response.
const MAX_TOKENS: u32 = 2000;

/// Chat service configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API key for the service.
    pub api_key: String,
    /// Base URL (default: the OpenAI-compatible endpoint).
    pub base_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Request timeout (default: 60s).
    pub timeout: Duration,
}

impl ChatConfig {
    /// Config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Minimal chat-completions client.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    config: ChatConfig,
}

impl ChatClient {
    /// Create a new chat client with the given configuration.
    pub fn new(config: ChatConfig) -> Result<Self, Error> {
        if config.api_key.trim().is_empty() {
            return Err(Error::AiUnavailable("empty API key".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::AiUnavailable(format!("failed to build chat client: {e}")))?;

        Ok(Self { http, config })
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one user prompt and return the model's raw text reply.
    pub async fn complete(&self, prompt: &str) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() { Error::Timeout } else { Error::FetchFailed(e.to_string()) }
            })?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(Error::AiUnavailable("authentication failed".into()));
        }
        if status == 429 {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            return Err(Error::HttpStatus { status: status.as_u16() });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::AiParse(format!("unreadable completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::AiParse("completion had no choices".into()))
    }
}
