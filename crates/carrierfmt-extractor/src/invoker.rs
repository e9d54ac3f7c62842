//! Model invocation with retry and exponential backoff

use crate::error::ExtractorError;
use crate::prompt::{PromptBuilder, PromptParams};
use carrierfmt_domain::traits::LlmProvider;
use carrierfmt_domain::ExtractionTask;
use carrierfmt_llm::LlmError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Classifies a provider failure as transient (worth retrying)
///
/// Rate limiting (HTTP 429 or "rate" + "limit"), 5xx statuses and timeouts
/// are transient; everything else is terminal. An HTTP status, when
/// present, decides on its own.
pub fn is_retryable(error: &LlmError) -> bool {
    if let Some(status) = error.status() {
        return status == 429 || (500..=599).contains(&status);
    }
    if matches!(error, LlmError::Timeout(_)) {
        return true;
    }

    let message = error.to_string().to_lowercase();
    (message.contains("rate") && message.contains("limit"))
        || message.contains("timeout")
        || message.contains("timed out")
        || message
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(is_transient_status)
}

/// A standalone `429` or `5xx` token
fn is_transient_status(token: &str) -> bool {
    token.len() == 3
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "429" || token.starts_with('5'))
}

/// Retry schedule for one invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts (at least 1)
    pub max_retries: u32,

    /// Delay before the first retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a new policy
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// Delay after failed attempt `attempt` (zero-based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Waits out a backoff delay
///
/// Swappable so tests can record delays instead of sleeping.
pub trait Sleeper: Send + Sync {
    /// Sleep for the given duration
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(delay))
    }
}

type Classifier = dyn Fn(&LlmError) -> bool + Send + Sync;

/// Calls the model once per (task, chunk), retrying transient failures
pub struct ExtractionInvoker<L> {
    provider: Arc<L>,
    policy: RetryPolicy,
    classifier: Arc<Classifier>,
    sleeper: Arc<dyn Sleeper>,
}

impl<L> Clone for ExtractionInvoker<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            policy: self.policy,
            classifier: Arc::clone(&self.classifier),
            sleeper: Arc::clone(&self.sleeper),
        }
    }
}

impl<L> ExtractionInvoker<L>
where
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    /// Create an invoker with the default classifier and the tokio sleeper
    pub fn new(provider: Arc<L>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            classifier: Arc::new(is_retryable),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the retry classifier
    pub fn with_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&LlmError) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Replace the backoff sleeper
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The retry policy in use
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Invoke the model for one chunk of one task
    ///
    /// Returns the raw response text. A terminal failure is returned at once;
    /// a transient failure is retried until the policy's attempts run out,
    /// and the last failure is then returned.
    pub async fn invoke(
        &self,
        task: ExtractionTask,
        chunk_text: &str,
        params: &PromptParams,
    ) -> Result<String, ExtractorError> {
        let prompt = PromptBuilder::new(task, chunk_text).with_params(params).build();
        debug!(task = %task, prompt_len = prompt.len(), "Invoking model");

        let mut attempt = 0;
        loop {
            let llm = Arc::clone(&self.provider);
            let call_prompt = prompt.clone();

            // LlmProvider is blocking
            let result = tokio::task::spawn_blocking(move || llm.generate(&call_prompt))
                .await
                .map_err(|e| ExtractorError::Invocation {
                    retryable: false,
                    attempts: attempt + 1,
                    message: format!("Task join error: {}", e),
                })?;

            let error = match result {
                Ok(response) => {
                    debug!(task = %task, attempt = attempt + 1, response_len = response.len(), "Model responded");
                    return Ok(response);
                }
                Err(error) => error,
            };

            let retryable = (self.classifier)(&error);
            attempt += 1;
            if !retryable || attempt >= self.policy.max_retries {
                return Err(ExtractorError::Invocation {
                    retryable,
                    attempts: attempt,
                    message: error.to_string(),
                });
            }

            let delay = self.policy.delay_for(attempt - 1);
            warn!(
                task = %task,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient model failure, retrying"
            );
            self.sleeper.sleep(delay).await;
        }
    }
}
