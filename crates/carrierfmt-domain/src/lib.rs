//! Carrierfmt Domain Layer
//!
//! Core vocabulary shared by every other crate in the workspace. It has no
//! I/O and (apart from UUID generation) no external dependencies.
//!
//! ## Key Concepts
//!
//! - **Task**: one of the four extraction goals run against a document
//!   (schema, field mappings, constraints, edge cases)
//! - **Chunk**: a bounded, ordered span of source text sent to the model in one call
//! - **Prompt**: the system/user message pair handed to a text-generation service
//! - **Progress**: observer hooks fired while chunks are processed
//!
//! ## Architecture
//!
//! Infrastructure implementations (HTTP providers, validators, the pipeline
//! itself) live in other crates and depend on the traits declared here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod progress;
pub mod prompt;
pub mod run;
pub mod task;
pub mod traits;

// Re-exports for convenience
pub use chunk::TextChunk;
pub use progress::{NoopObserver, ProgressEvent, ProgressObserver};
pub use prompt::Prompt;
pub use run::RunId;
pub use task::ExtractionTask;
