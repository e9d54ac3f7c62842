//! Schema validation logic

use crate::model::{AuthenticationMethod, CarrierSchema, Endpoint, RateLimit};
use crate::{FieldIssue, ValidationConfig, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The CarrierValidator turns normalized JSON into a `CarrierSchema`
pub struct CarrierValidator {
    config: ValidationConfig,
}

impl CarrierValidator {
    /// Create a new validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate a normalized schema payload
    ///
    /// # Arguments
    ///
    /// * `value` - The JSON object produced by the model after normalization
    ///
    /// # Returns
    ///
    /// The typed schema, or every rejected field with its path
    pub fn validate(&self, value: &Value) -> Result<CarrierSchema, ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::NotAnObject(json_kind(value).to_string()))?;

        // 1. Element-level decoding, so errors name the offending index
        let mut issues = Vec::new();
        decode_elements::<Endpoint>(obj, "endpoints", &mut issues);
        decode_elements::<AuthenticationMethod>(obj, "authentication", &mut issues);
        decode_elements::<RateLimit>(obj, "rate_limits", &mut issues);
        if !issues.is_empty() {
            return Err(ValidationError::Invalid(issues));
        }

        // 2. Whole-document decoding (top-level scalars)
        let mut schema: CarrierSchema = serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::Invalid(vec![FieldIssue::new("$", e.to_string())]))?;
        schema.name = schema.name.trim().to_string();

        // 3. Semantic rules
        self.validate_schema(&schema)?;
        Ok(schema)
    }

    /// Re-check semantic rules on an already typed schema (e.g. after merging)
    pub fn validate_schema(&self, schema: &CarrierSchema) -> Result<(), ValidationError> {
        let issues = self.semantic_issues(schema);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(issues))
        }
    }

    fn semantic_issues(&self, schema: &CarrierSchema) -> Vec<FieldIssue> {
        let mut issues = Vec::new();

        if schema.name.trim().is_empty() {
            issues.push(FieldIssue::new("name", "Carrier name cannot be empty"));
        }

        if self.config.require_absolute_urls {
            if !is_http_url(&schema.base_url) {
                issues.push(FieldIssue::new("base_url", format!("not an http(s) URL: {:?}", schema.base_url)));
            }
            if let Some(doc_url) = &schema.documentation_url {
                if !is_http_url(doc_url) {
                    issues.push(FieldIssue::new("documentation_url", format!("not an http(s) URL: {:?}", doc_url)));
                }
            }
        }

        if self.config.require_endpoints && schema.endpoints.is_empty() {
            issues.push(FieldIssue::new("endpoints", "Must have at least one endpoint"));
        }

        for (i, endpoint) in schema.endpoints.iter().enumerate() {
            if !endpoint.path.starts_with('/') {
                issues.push(FieldIssue::new(format!("endpoints[{}].path", i), "Path must start with /"));
            }
            if self.config.require_endpoint_summary && endpoint.summary.trim().is_empty() {
                issues.push(FieldIssue::new(format!("endpoints[{}].summary", i), "Summary cannot be empty"));
            }
            if let Some(request) = &endpoint.request {
                for (j, param) in request.parameters.iter().enumerate() {
                    if param.name.trim().is_empty() {
                        issues.push(FieldIssue::new(
                            format!("endpoints[{}].request.parameters[{}].name", i, j),
                            "Parameter name cannot be empty",
                        ));
                    }
                }
            }
            for (j, response) in endpoint.responses.iter().enumerate() {
                if !(100..=599).contains(&response.status_code) {
                    issues.push(FieldIssue::new(
                        format!("endpoints[{}].responses[{}].status_code", i, j),
                        format!("Status code must be between 100 and 599, got {}", response.status_code),
                    ));
                }
            }
        }

        for (i, auth) in schema.authentication.iter().enumerate() {
            if auth.name.trim().is_empty() {
                issues.push(FieldIssue::new(format!("authentication[{}].name", i), "Name cannot be empty"));
            }
        }

        for (i, limit) in schema.rate_limits.iter().enumerate() {
            if limit.requests == 0 {
                issues.push(FieldIssue::new(format!("rate_limits[{}].requests", i), "Must be greater than 0"));
            }
        }

        issues
    }
}

fn decode_elements<T: DeserializeOwned>(obj: &Map<String, Value>, field: &str, issues: &mut Vec<FieldIssue>) {
    match obj.get(field) {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if let Err(e) = serde_json::from_value::<T>(item.clone()) {
                    issues.push(FieldIssue::new(format!("{}[{}]", field, i), e.to_string()));
                }
            }
        }
        Some(other) => issues.push(FieldIssue::new(field, format!("expected an array, got {}", json_kind(other)))),
    }
}

fn is_http_url(s: &str) -> bool {
    let s = s.trim();
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
