//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::Prompt;

/// Trait for text-generation provider operations
///
/// Implemented by the infrastructure layer (carrierfmt-llm). Calls are
/// blocking; async callers are expected to run them on a blocking thread.
pub trait LlmProvider {
    /// Error type for provider operations
    type Error;

    /// Generate a free-text completion for the prompt
    fn generate(&self, prompt: &Prompt) -> Result<String, Self::Error>;

    /// Name of the underlying model, recorded in extraction metadata
    fn model_name(&self) -> &str;
}
