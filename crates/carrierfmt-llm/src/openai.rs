//! OpenAI-compatible Provider Implementation
//!
//! Talks to any service exposing the `/v1/chat/completions` endpoint
//! (OpenAI itself, Azure-style gateways, local servers such as vLLM).
//!
//! # Features
//!
//! - Blocking HTTP communication (call it from `spawn_blocking`)
//! - Configurable base URL, model and request timeout
//! - JSON response mode for models known to support it
//! - One request per call: HTTP status is preserved for retry classification
//!
//! # Examples
//!
//! ```no_run
//! use carrierfmt_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("https://api.openai.com/v1", "gpt-4.1-mini", "sk-...")
//!     .unwrap();
//! ```

use crate::LlmError;
use carrierfmt_domain::traits::LlmProvider as LlmProviderTrait;
use carrierfmt_domain::Prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default timeout for a single request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Environment variable overriding the model
pub const MODEL_ENV: &str = "LLM_MODEL";

/// Chat-completions provider
pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root including the version segment (e.g. "https://api.openai.com/v1")
    /// - `model`: Model to use (e.g. "gpt-4.1-mini")
    /// - `api_key`: Bearer token sent with every request
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(base_url, model, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new provider with a custom per-request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            temperature: 0.0,
            client,
        })
    }

    /// Build a provider from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `LLM_MODEL`
    ///
    /// An explicit `model` wins over the environment.
    pub fn from_env(model: Option<&str>) -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingCredentials(API_KEY_ENV.to_string()))?;
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = model
            .map(str::to_string)
            .or_else(|| std::env::var(MODEL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self::new(base_url, model, api_key)
    }

    /// Set the sampling temperature (default 0.0 for deterministic output)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Whether the model accepts `response_format: json_object`
    fn supports_json_mode(&self) -> bool {
        let model = self.model.to_lowercase();
        model.contains("gpt") || model.contains("o1")
    }

    fn send(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            temperature: self.temperature,
            response_format: self
                .supports_json_mode()
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(e.to_string())
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(LlmError::Http { status: status.as_u16(), message });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no message content".to_string()))
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &Prompt) -> Result<String, Self::Error> {
        self.send(prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
