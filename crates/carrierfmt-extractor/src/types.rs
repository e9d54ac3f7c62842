//! Types for extraction results

use carrierfmt_domain::ExtractionTask;
use carrierfmt_validator::CarrierSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Structured output of one chunk for one task, after normalization
#[derive(Debug, Clone, PartialEq)]
pub enum PartialResult {
    /// Validated schema (schema task)
    Schema(CarrierSchema),
    /// List of items (field mappings, constraints, edge cases)
    List(Vec<Value>),
}

impl PartialResult {
    /// Number of items: endpoints for a schema, entries for a list
    pub fn item_count(&self) -> usize {
        match self {
            PartialResult::Schema(schema) => schema.endpoints.len(),
            PartialResult::List(items) => items.len(),
        }
    }
}

/// Deduplicated combination of every partial result of one task
#[derive(Debug, Clone, PartialEq)]
pub enum MergedResult {
    /// Merged carrier schema
    Schema(CarrierSchema),
    /// Merged field mappings
    FieldMappings(Vec<Value>),
    /// Merged constraints
    Constraints(Vec<Value>),
    /// Merged edge cases
    EdgeCases(Vec<Value>),
}

impl MergedResult {
    /// Wrap a merged list in the variant for its task
    ///
    /// Returns `None` for the schema task, which is not list-shaped.
    pub fn from_list(task: ExtractionTask, items: Vec<Value>) -> Option<Self> {
        match task {
            ExtractionTask::Schema => None,
            ExtractionTask::FieldMappings => Some(MergedResult::FieldMappings(items)),
            ExtractionTask::Constraints => Some(MergedResult::Constraints(items)),
            ExtractionTask::EdgeCases => Some(MergedResult::EdgeCases(items)),
        }
    }

    /// The task this result belongs to
    pub fn task(&self) -> ExtractionTask {
        match self {
            MergedResult::Schema(_) => ExtractionTask::Schema,
            MergedResult::FieldMappings(_) => ExtractionTask::FieldMappings,
            MergedResult::Constraints(_) => ExtractionTask::Constraints,
            MergedResult::EdgeCases(_) => ExtractionTask::EdgeCases,
        }
    }

    /// Number of items: endpoints for a schema, entries for a list
    pub fn item_count(&self) -> usize {
        match self {
            MergedResult::Schema(schema) => schema.endpoints.len(),
            MergedResult::FieldMappings(items)
            | MergedResult::Constraints(items)
            | MergedResult::EdgeCases(items) => items.len(),
        }
    }

    /// The schema, if this is a schema result
    pub fn into_schema(self) -> Option<CarrierSchema> {
        match self {
            MergedResult::Schema(schema) => Some(schema),
            _ => None,
        }
    }

    /// The list, if this is a list result
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            MergedResult::Schema(_) => None,
            MergedResult::FieldMappings(items)
            | MergedResult::Constraints(items)
            | MergedResult::EdgeCases(items) => Some(items),
        }
    }
}

/// Metadata about a document run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Unique, time-ordered run identifier
    pub run_id: String,

    /// Model that produced the results
    pub llm_model: String,

    /// Number of chunks each task was split into
    pub chunks_per_task: BTreeMap<String, usize>,

    /// Prompt version per task
    pub prompt_versions: BTreeMap<String, String>,

    /// Wall-clock processing time (milliseconds)
    pub processing_time_ms: u64,

    /// Completion time (Unix seconds)
    pub extracted_at: u64,
}

/// The four merged results of one document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutput {
    /// Carrier schema
    pub schema: CarrierSchema,

    /// Field mappings
    pub field_mappings: Vec<Value>,

    /// Business-rule constraints
    pub constraints: Vec<Value>,

    /// Route-specific edge cases
    pub edge_cases: Vec<Value>,

    /// Run metadata
    pub metadata: ExtractionMetadata,
}
