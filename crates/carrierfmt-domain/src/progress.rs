//! Progress reporting hooks

use crate::ExtractionTask;

/// A progress notification emitted while a task processes its chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A task is about to process `total_chunks` chunks
    TaskStarted {
        /// Task being run
        task: ExtractionTask,
        /// Number of chunks the text was split into
        total_chunks: usize,
    },

    /// A chunk is about to be sent to the model
    ChunkStarted {
        /// Task being run
        task: ExtractionTask,
        /// Zero-based chunk index
        index: usize,
        /// Number of chunks in total
        total: usize,
        /// Chunk size in bytes
        size: usize,
    },

    /// All chunks of a task were processed and merged
    TaskFinished {
        /// Task that finished
        task: ExtractionTask,
        /// Number of items in the merged result (endpoints for schema)
        items: usize,
    },
}

/// Observer receiving progress events
///
/// Observers are purely informational: they cannot influence control flow.
pub trait ProgressObserver: Send + Sync {
    /// Called for every progress event, in order
    fn on_event(&self, event: &ProgressEvent);
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}
