//! The persisted extraction artifact

use crate::error::ExtractorError;
use crate::types::{ExtractionMetadata, ExtractionOutput};
use carrierfmt_validator::CarrierSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Version of the artifact contract
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Version of the generator that wrote the artifact
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One document's merged results plus version tags, as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionArtifact {
    /// Artifact contract version
    pub schema_version: String,

    /// Generator version
    pub generator_version: String,

    /// Carrier schema
    pub schema: CarrierSchema,

    /// Field mappings
    pub field_mappings: Vec<Value>,

    /// Business-rule constraints
    pub constraints: Vec<Value>,

    /// Route-specific edge cases
    pub edge_cases: Vec<Value>,

    /// Run metadata
    pub extraction_metadata: ExtractionMetadata,
}

impl ExtractionArtifact {
    /// Tag a finished document run with the current versions
    pub fn from_output(output: ExtractionOutput) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generator_version: GENERATOR_VERSION.to_string(),
            schema: output.schema,
            field_mappings: output.field_mappings,
            constraints: output.constraints,
            edge_cases: output.edge_cases,
            extraction_metadata: output.metadata,
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ExtractorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the artifact so that `path` either keeps its old content or
    /// holds the complete new artifact
    ///
    /// The JSON goes to a temporary file in the same directory, which is
    /// then renamed over `path`.
    pub fn write_atomic(&self, path: impl AsRef<Path>) -> Result<(), ExtractorError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ExtractorError::Io(e.error))?;

        info!(path = %path.display(), bytes = json.len(), "Wrote extraction artifact");
        Ok(())
    }
}

/// Compare an artifact's `schema_version` with the current contract
///
/// Returns `(found, expected)` on mismatch. Artifacts written before
/// versioning (no `schema_version` key) are accepted.
pub fn check_schema_version(artifact: &Value) -> Option<(String, String)> {
    let found = artifact.get("schema_version")?;
    let found = match found.as_str() {
        Some(s) => s.to_string(),
        None => found.to_string(),
    };
    (found != SCHEMA_VERSION).then(|| (found, SCHEMA_VERSION.to_string()))
}
