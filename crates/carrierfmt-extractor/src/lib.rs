//! Carrierfmt Extractor
//!
//! Turns long, unstructured carrier API documentation into structured
//! artifacts by repeatedly calling an unreliable text-generation service and
//! assembling its fragmentary, often malformed answers.
//!
//! # Architecture
//!
//! ```text
//! text → TextChunker → for each chunk:
//!          ExtractionInvoker (retry/backoff) → extract_json → normalize
//!          → CarrierValidator (schema task only) → partial
//!      → ResultMerger → merged result per task
//! ```
//!
//! # Key Features
//!
//! - **Boundary-aware chunking**: paragraph breaks, then line breaks, then hard cuts
//! - **Retry with exponential backoff**: injectable retry classifier and sleeper
//! - **JSON recovery**: code fences, prose, comments, trailing commas, raw control characters
//! - **Normalization**: auth types, rate limits, status codes, wrapped lists
//! - **Deterministic merging**: order-preserving, first occurrence wins
//!
//! # Example Usage
//!
//! ```no_run
//! use carrierfmt_extractor::{Extractor, ExtractorConfig};
//! use carrierfmt_llm::MockProvider;
//! use carrierfmt_validator::CarrierValidator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("[]");
//! let extractor = Extractor::new(llm, CarrierValidator::default_config(), ExtractorConfig::default())?;
//!
//! let output = extractor.run_document("Carrier API documentation ...").await?;
//! println!("{} endpoints", output.schema.endpoints.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod artifact;
mod chunking;
mod config;
mod error;
mod extractor;
mod invoker;
mod merger;
mod normalizer;
mod prompt;
mod sanitizer;
mod types;


pub use artifact::{check_schema_version, ExtractionArtifact, GENERATOR_VERSION, SCHEMA_VERSION};
pub use chunking::TextChunker;
pub use config::ExtractorConfig;
pub use error::{ChunkingError, ExtractorError, ParseError};
pub use extractor::Extractor;
pub use invoker::{is_retryable, ExtractionInvoker, RetryPolicy, Sleeper, TokioSleeper};
pub use merger::{fingerprint, ResultMerger};
pub use normalizer::{normalize, normalize_auth_type};
pub use prompt::{prompt_versions, PromptBuilder, PromptParams};
pub use sanitizer::{extract_json, ParsedPayload};
pub use types::{ExtractionMetadata, ExtractionOutput, MergedResult, PartialResult};
