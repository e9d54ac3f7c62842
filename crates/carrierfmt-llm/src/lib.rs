//! Carrierfmt LLM Provider Layer
//!
//! Pluggable text-generation providers implementing the `LlmProvider` trait
//! from `carrierfmt-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! Providers make exactly one request per `generate` call. Retry and backoff
//! are the caller's concern (see the extractor's invoker), so every failure
//! carries enough detail (HTTP status, message) to classify it.
//!
//! # Examples
//!
//! ```
//! use carrierfmt_llm::MockProvider;
//! use carrierfmt_domain::{traits::LlmProvider, Prompt};
//!
//! let provider = MockProvider::new(r#"{"name": "Carrier"}"#);
//! let result = provider.generate(&Prompt::new("system", "user")).unwrap();
//! assert_eq!(result, r#"{"name": "Carrier"}"#);
//! ```

#![warn(missing_docs)]

pub mod openai;

use carrierfmt_domain::traits::LlmProvider as LlmProviderTrait;
use carrierfmt_domain::Prompt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or transport failure before a response was received
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Required credentials are not configured
    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// Responses are served from a script queue first (in order), then from
/// substring rules matched against the user message, then the default
/// response. Every prompt received is recorded.
///
/// # Examples
///
/// ```
/// use carrierfmt_llm::{LlmError, MockProvider};
/// use carrierfmt_domain::{traits::LlmProvider, Prompt};
///
/// let provider = MockProvider::new("[]");
/// provider.push_error(LlmError::Http { status: 429, message: "slow down".into() });
/// provider.push_response("[1]");
///
/// let prompt = Prompt::new("s", "u");
/// assert!(provider.generate(&prompt).is_err());
/// assert_eq!(provider.generate(&prompt).unwrap(), "[1]");
/// assert_eq!(provider.generate(&prompt).unwrap(), "[]");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    model: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    rules: Arc<Mutex<Vec<(String, String)>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model: "mock".to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the reported model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Queue a response served before any rule or default
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Ok(response.into()));
    }

    /// Queue a failure served before any rule or default
    pub fn push_error(&self, error: LlmError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Respond with `response` whenever the user message contains `needle`
    pub fn add_response_containing(&self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((needle.into(), response.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// All prompts received so far, in call order
    pub fn prompts(&self) -> Vec<Prompt> {
        lock(&self.prompts).clone()
    }

    /// Reset the call history
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking test thread must not wedge the other clones
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &Prompt) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.clone());

        if let Some(scripted) = lock(&self.script).pop_front() {
            return scripted;
        }

        let rules = lock(&self.rules);
        if let Some((_, response)) = rules.iter().find(|(needle, _)| prompt.user.contains(needle.as_str())) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
