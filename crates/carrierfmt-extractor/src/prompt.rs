//! Prompt construction for each extraction task

use carrierfmt_domain::{ExtractionTask, Prompt};
use std::collections::BTreeMap;

/// Carrier name used when the schema task has not discovered one
pub const DEFAULT_CARRIER_NAME: &str = "the carrier";

const CARRIER_PLACEHOLDER: &str = "{carrier_name}";
const DOCUMENT_PLACEHOLDER: &str = "{documentation}";

/// Per-run prompt parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParams {
    /// Carrier name discovered by the schema task
    pub carrier_name: Option<String>,
}

impl PromptParams {
    /// Parameters carrying a carrier name
    pub fn with_carrier_name(name: impl Into<String>) -> Self {
        Self {
            carrier_name: Some(name.into()),
        }
    }
}

/// Version of each prompt group, recorded in extraction metadata
///
/// Bump a version whenever its prompt text changes.
pub fn prompt_versions() -> BTreeMap<String, String> {
    ExtractionTask::ALL
        .iter()
        .map(|task| (task.as_str().to_string(), template(*task).version.to_string()))
        .collect()
}

struct Template {
    version: &'static str,
    system: &'static str,
    user: &'static str,
}

fn template(task: ExtractionTask) -> &'static Template {
    match task {
        ExtractionTask::Schema => &SCHEMA,
        ExtractionTask::FieldMappings => &FIELD_MAPPINGS,
        ExtractionTask::Constraints => &CONSTRAINTS,
        ExtractionTask::EdgeCases => &EDGE_CASES,
    }
}

/// Builds the system/user prompt pair for one task and one chunk
pub struct PromptBuilder<'a> {
    task: ExtractionTask,
    text: &'a str,
    carrier_name: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(task: ExtractionTask, text: &'a str) -> Self {
        Self {
            task,
            text,
            carrier_name: None,
        }
    }

    /// Set the carrier name (used by the field-mappings prompt)
    pub fn with_carrier_name(mut self, name: &'a str) -> Self {
        self.carrier_name = Some(name);
        self
    }

    /// Apply run parameters
    pub fn with_params(self, params: &'a PromptParams) -> Self {
        match params.carrier_name.as_deref() {
            Some(name) if !name.trim().is_empty() => self.with_carrier_name(name),
            _ => self,
        }
    }

    /// Build the prompt
    pub fn build(&self) -> Prompt {
        let template = template(self.task);
        let carrier = self.carrier_name.unwrap_or(DEFAULT_CARRIER_NAME);
        // Carrier name first so a document mentioning the placeholder is left alone
        let user = template
            .user
            .replace(CARRIER_PLACEHOLDER, carrier)
            .replace(DOCUMENT_PLACEHOLDER, self.text);
        Prompt::new(template.system, user)
    }
}

static SCHEMA: Template = Template {
    version: "1.0",
    system: r#"You are an expert API documentation parser. Extract structured API information from carrier documentation and convert it to a Universal Carrier Format JSON schema.

Identify:
1. All API endpoints (paths, HTTP methods)
2. Request parameters (query, path, headers, body)
3. Response schemas (status codes, body structure)
4. Authentication methods
5. Rate limits

Output ONLY valid JSON:
- No markdown code blocks
- No trailing commas
- No comments
- All strings properly escaped
- No text before or after the JSON

Start your response with { and end with }"#,
    user: r#"Extract the API schema from this carrier documentation:

{documentation}

Return a JSON object with:
- name: carrier name
- base_url: base API URL
- version: API version
- description: brief description
- endpoints: array of endpoints, each with path (e.g. "/api/v1/track"), method (GET, POST, ...), summary, request (parameters and body schema) and responses (status_code, description)
- authentication: array of authentication methods
- rate_limits: array of rate limits

Rate limits: every object MUST have "requests" (number of requests allowed, never "limit") and "period".
Example: {"requests": 100, "period": "1 minute", "description": "100 requests per minute"}

Authentication: "type" MUST be one of "api_key", "bearer", "basic", "oauth2" or "custom", and every object MUST have a "name" (e.g. "API Key Authentication").
- API keys, X-API-Key -> "api_key"
- Bearer tokens, JWT -> "bearer"
- Basic auth, Digest -> "basic"
- OAuth, OAuth2 -> "oauth2"
- WS-Security, SOAP headers, other protocols -> "custom"

Return ONLY valid JSON."#,
};

static FIELD_MAPPINGS: Template = Template {
    version: "1.0",
    system: "You are an expert at identifying field name mappings and validation rules in API documentation.",
    user: r#"From this {carrier_name} API documentation, extract field name mappings with validation metadata.

Look for carrier field names (e.g. "trk_num", "stat", "s_addr_1") and map them to universal field names (e.g. "tracking_number", "status", "sender_address_line_1").

Return ONLY a JSON array at the top level. Do not wrap it in an object.
[
  {"carrier_field": "trk_num", "universal_field": "tracking_number", "description": "Tracking number", "required": true, "min_length": 10, "max_length": 20, "type": "string", "pattern": "^[A-Z0-9]{10,20}$"},
  {"carrier_field": "stat", "universal_field": "status", "description": "Shipment status", "required": true, "type": "string", "enum_values": ["IN_TRANSIT", "DELIVERED", "PENDING"]}
]

carrier_field, universal_field and description are required. Include required, max_length, min_length, type, pattern and enum_values only when documented.

Documentation:
{documentation}"#,
};

static CONSTRAINTS: Template = Template {
    version: "1.0",
    system: "You are an expert at identifying business rules and constraints in API documentation.",
    user: r#"Extract business rules and constraints from this API documentation.

Look for field validation rules (format, length, required/optional), conditional rules ("if shipping to X, then Y"), unit conversions and format requirements (dates, phone numbers).

Return a JSON array:
[
  {"field": "weight", "rule": "Must be in grams if shipping to Germany", "type": "unit_conversion", "condition": "destination_country == 'DE'"},
  {"field": "LanguageCode", "rule": "Supported codes include eng, dan, ita; default eng", "type": "enum", "allowed_values": ["eng", "dan", "ita"]},
  {"field": "MessageReference", "rule": "Length between 28 and 36 characters", "min_length": 28, "max_length": 36}
]

Use allowed_values, max_length, min_length and pattern when the documentation specifies them.

Documentation:
{documentation}"#,
};

static EDGE_CASES: Template = Template {
    version: "1.0",
    system: "You are an expert at finding route-specific and conditional requirements in shipping and carrier API documentation.",
    user: r#"Scan this documentation and extract edge cases: route-specific requirements, surcharges, restrictions and special rules that apply only under certain conditions.

Look for customs requirements, surcharges (remote area, fuel, peak season), restrictions (hazardous goods, weight or size limits), route-specific rules and documentation references.

Return a JSON array. Each object has type, route, requirement, documentation, condition, applies_to and surcharge_amount (null when not applicable):
[
  {"type": "customs_requirement", "route": "EU -> Canary Islands", "requirement": "Customs declaration required", "documentation": "Section 4.2.3, page 87", "condition": null, "applies_to": null, "surcharge_amount": null},
  {"type": "surcharge", "route": null, "requirement": "Remote area surcharge", "documentation": null, "condition": "remote_area", "applies_to": ["postcodes starting with 'IV', 'KW', 'PA'"], "surcharge_amount": "2.50 GBP"}
]

Documentation:
{documentation}"#,
};
