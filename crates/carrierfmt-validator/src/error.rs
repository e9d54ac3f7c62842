//! Validator error types

use std::fmt;
use thiserror::Error;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// JSON path of the offending field (e.g. `endpoints[2].method`)
    pub path: String,

    /// What is wrong with it
    pub message: String,
}

impl FieldIssue {
    /// Create a new issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors that can occur during schema validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The payload was not a JSON object
    #[error("Schema payload must be a JSON object, got {0}")]
    NotAnObject(String),

    /// One or more fields were rejected
    #[error("Schema validation failed: {}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),
}

impl ValidationError {
    /// Rejected fields, empty for shape errors
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ValidationError::Invalid(issues) => issues,
            ValidationError::NotAnObject(_) => &[],
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
