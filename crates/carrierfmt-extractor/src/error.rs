//! Error types for the Extractor

use carrierfmt_domain::ExtractionTask;
use carrierfmt_validator::ValidationError;
use std::fmt;
use thiserror::Error;

/// Invalid chunking configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkingError {
    /// Overlap would swallow the whole window
    #[error("chunk_overlap_chars ({overlap}) must be smaller than max_chars_per_chunk ({max})")]
    OverlapTooLarge {
        /// Configured overlap
        overlap: usize,
        /// Configured window size
        max: i64,
    },
}

/// The sanitizer could not recover valid JSON from a model response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (line {line}, column {column}) near: {context}")]
pub struct ParseError {
    /// Decoder message
    pub message: String,

    /// Up to 500 characters of text around the error position
    pub context: String,

    /// 1-based line of the error (0 when unknown)
    pub line: usize,

    /// 1-based column of the error (0 when unknown)
    pub column: usize,
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Invalid chunking configuration
    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// The text-generation service failed
    #[error("LLM invocation failed after {attempts} attempt(s) ({kind}): {message}", kind = transience(.retryable))]
    Invocation {
        /// Whether the last failure was classified as transient
        retryable: bool,
        /// Number of calls made
        attempts: u32,
        /// Root-cause message
        message: String,
    },

    /// No valid JSON could be recovered
    #[error("JSON parse error: {0}")]
    Parse(#[from] ParseError),

    /// Schema rejected by the validator
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Merge called without any partial result
    #[error("Nothing to merge: no partial results")]
    EmptyMerge,

    /// A partial result had the wrong shape for its task
    #[error("Partial result does not match task {0}")]
    ShapeMismatch(ExtractionTask),

    /// The task did not complete in time
    #[error("Task {task} timed out after {secs}s")]
    Timeout {
        /// Task that timed out
        task: ExtractionTask,
        /// Configured timeout
        secs: u64,
    },

    /// Failure attributed to a task (and chunk, when applicable)
    #[error("{}: {source}", location(.task, .chunk))]
    Task {
        /// Task being run
        task: ExtractionTask,
        /// Chunk index, when the failure belongs to one chunk
        chunk: Option<usize>,
        /// Root cause
        #[source]
        source: Box<ExtractorError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractorError {
    /// Attribute this error to a task and optional chunk
    pub fn in_task(self, task: ExtractionTask, chunk: Option<usize>) -> Self {
        match self {
            already @ ExtractorError::Task { .. } => already,
            already @ ExtractorError::Timeout { .. } => already,
            other => ExtractorError::Task {
                task,
                chunk,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping task attribution
    pub fn root_cause(&self) -> &ExtractorError {
        match self {
            ExtractorError::Task { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn transience(retryable: &bool) -> &'static str {
    if *retryable {
        "transient"
    } else {
        "terminal"
    }
}

fn location(task: &ExtractionTask, chunk: &Option<usize>) -> Location {
    Location {
        task: *task,
        chunk: *chunk,
    }
}

struct Location {
    task: ExtractionTask,
    chunk: Option<usize>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk {
            Some(idx) => write!(f, "Task {} failed at chunk {}", self.task, idx),
            None => write!(f, "Task {} failed", self.task),
        }
    }
}
