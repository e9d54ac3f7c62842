//! Task module - the four extraction goals

use std::fmt;

/// An extraction task run against the same source text
///
/// The task decides which prompt is sent, what shape the model output must
/// have, and how partial results from several chunks are deduplicated:
/// - Schema: a single object; endpoints deduplicated by (path, method)
/// - FieldMappings: a list; deduplicated by (carrier_field, universal_field)
/// - Constraints: a list; deduplicated by canonical fingerprint
/// - EdgeCases: a list; deduplicated by canonical fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtractionTask {
    /// Carrier API schema (endpoints, authentication, rate limits)
    Schema,

    /// Carrier field name to universal field name mappings
    FieldMappings,

    /// Business rules and validation constraints
    Constraints,

    /// Route-specific requirements, surcharges and restrictions
    EdgeCases,
}

impl ExtractionTask {
    /// Every task, in the order a document run executes them
    pub const ALL: [ExtractionTask; 4] = [
        ExtractionTask::Schema,
        ExtractionTask::FieldMappings,
        ExtractionTask::Constraints,
        ExtractionTask::EdgeCases,
    ];

    /// Get the task name as a string (also the artifact key)
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionTask::Schema => "schema",
            ExtractionTask::FieldMappings => "field_mappings",
            ExtractionTask::Constraints => "constraints",
            ExtractionTask::EdgeCases => "edge_cases",
        }
    }

    /// Parse a task from a string, accepting `-` in place of `_`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "schema" => Some(ExtractionTask::Schema),
            "field_mappings" | "mappings" => Some(ExtractionTask::FieldMappings),
            "constraints" => Some(ExtractionTask::Constraints),
            "edge_cases" => Some(ExtractionTask::EdgeCases),
            _ => None,
        }
    }

    /// Whether the model is expected to return a JSON array for this task
    pub fn is_list_shaped(&self) -> bool {
        !matches!(self, ExtractionTask::Schema)
    }
}

impl fmt::Display for ExtractionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExtractionTask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid extraction task: {}", s))
    }
}
