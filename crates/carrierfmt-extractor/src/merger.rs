//! Merging of per-chunk partial results
//!
//! Every strategy keeps the first occurrence of an identity key and drops
//! later duplicates, so the result depends on chunk order and never on
//! completion order.

use crate::error::ExtractorError;
use crate::types::{MergedResult, PartialResult};
use carrierfmt_domain::ExtractionTask;
use carrierfmt_validator::{CarrierSchema, CarrierValidator};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Combines partial results of one task into a single result
pub struct ResultMerger<'a> {
    validator: &'a CarrierValidator,
    fingerprint_len: usize,
}

impl<'a> ResultMerger<'a> {
    /// Create a merger validating merged schemas with `validator`
    pub fn new(validator: &'a CarrierValidator, fingerprint_len: usize) -> Self {
        Self {
            validator,
            fingerprint_len,
        }
    }

    /// Merge the partial results of `task`, in chunk order
    pub fn merge(
        &self,
        task: ExtractionTask,
        partials: Vec<PartialResult>,
    ) -> Result<MergedResult, ExtractorError> {
        if partials.is_empty() {
            return Err(ExtractorError::EmptyMerge);
        }

        if task == ExtractionTask::Schema {
            let schemas = partials
                .into_iter()
                .map(|p| match p {
                    PartialResult::Schema(schema) => Ok(schema),
                    PartialResult::List(_) => Err(ExtractorError::ShapeMismatch(task)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return self.merge_schemas(schemas).map(MergedResult::Schema);
        }

        let lists = partials
            .into_iter()
            .map(|p| match p {
                PartialResult::List(items) => Ok(items),
                PartialResult::Schema(_) => Err(ExtractorError::ShapeMismatch(task)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let merged = if lists.len() == 1 {
            lists.into_iter().flatten().collect()
        } else if task == ExtractionTask::FieldMappings {
            merge_field_mappings(lists)
        } else {
            merge_by_fingerprint(lists, self.fingerprint_len)
        };
        MergedResult::from_list(task, merged).ok_or(ExtractorError::ShapeMismatch(task))
    }

    /// Scalars from the first schema; endpoints unioned by (path, method)
    fn merge_schemas(&self, schemas: Vec<CarrierSchema>) -> Result<CarrierSchema, ExtractorError> {
        let mut iter = schemas.into_iter();
        let Some(mut merged) = iter.next() else {
            return Err(ExtractorError::EmptyMerge);
        };
        let mut rest = iter.peekable();
        if rest.peek().is_none() {
            return Ok(merged);
        }

        let mut seen: HashSet<(String, &'static str)> =
            merged.endpoints.iter().map(|e| e.identity()).collect();
        for schema in rest {
            for endpoint in schema.endpoints {
                if seen.insert(endpoint.identity()) {
                    merged.endpoints.push(endpoint);
                } else {
                    debug!(path = %endpoint.path, method = %endpoint.method, "Dropping duplicate endpoint");
                }
            }
        }

        self.validator.validate_schema(&merged)?;
        Ok(merged)
    }
}

/// Deduplicate field mappings by (carrier_field, universal_field)
///
/// Entries that are not objects, or that have neither field, are dropped.
fn merge_field_mappings(lists: Vec<Vec<Value>>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for item in lists.into_iter().flatten() {
        let Some(obj) = item.as_object() else {
            debug!(item = %item, "Dropping non-object field mapping");
            continue;
        };
        let carrier = obj.get("carrier_field").map(key_part);
        let universal = obj.get("universal_field").map(key_part);
        if carrier.is_none() && universal.is_none() {
            debug!(item = %item, "Dropping field mapping without carrier_field or universal_field");
            continue;
        }
        if seen.insert((carrier, universal)) {
            merged.push(item);
        }
    }
    merged
}

fn key_part(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Deduplicate items that have no natural key by canonical fingerprint
fn merge_by_fingerprint(lists: Vec<Vec<Value>>, len: usize) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for item in lists.into_iter().flatten() {
        if seen.insert(fingerprint(&item, len)) {
            merged.push(item);
        }
    }
    merged
}

/// Canonical JSON (object keys sorted) truncated to `len` characters
pub fn fingerprint(value: &Value, len: usize) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    match out.char_indices().nth(len) {
        Some((cut, _)) => {
            out.truncate(cut);
            out
        }
        None => out,
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
