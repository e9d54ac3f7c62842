//! Field normalization of decoded model output
//!
//! Reshapes the many ways a model phrases the same thing into the shapes
//! the validator and merger expect. Normalization never fails: anything it
//! cannot repair is left for the validator, or replaced with an empty list
//! and a warning.

use carrierfmt_domain::ExtractionTask;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Canonical authentication types
const AUTH_TYPES: [&str; 5] = ["api_key", "bearer", "basic", "oauth2", "custom"];

/// Free-text authentication types and their canonical type
const AUTH_SYNONYMS: &[(&str, &str)] = &[
    ("jwt", "bearer"),
    ("token", "bearer"),
    ("bearer_token", "bearer"),
    ("bearer token", "bearer"),
    ("digest", "basic"),
    ("http_basic", "basic"),
    ("basic_auth", "basic"),
    ("apikey", "api_key"),
    ("api-key", "api_key"),
    ("api key", "api_key"),
    ("x-api-key", "api_key"),
    ("oauth", "oauth2"),
    ("oauth_2", "oauth2"),
    ("oauth 2.0", "oauth2"),
    ("oauth2.0", "oauth2"),
    ("soap", "custom"),
    ("ws-security", "custom"),
    ("ws_security", "custom"),
    ("wssecurity", "custom"),
    ("username_token", "custom"),
    ("usernametoken", "custom"),
];

/// Display names for canonical authentication types
const AUTH_LABELS: &[(&str, &str)] = &[
    ("api_key", "API Key Authentication"),
    ("bearer", "Bearer Token Authentication"),
    ("basic", "Basic Authentication"),
    ("oauth2", "OAuth 2.0 Authentication"),
    ("custom", "Custom Authentication"),
];

/// Keys under which a model may wrap a list result, tried in order
const ALT_KEYS: &[(ExtractionTask, &[&str])] = &[
    (
        ExtractionTask::FieldMappings,
        &["field_mappings", "fieldMappings", "mappings"],
    ),
    (
        ExtractionTask::Constraints,
        &["constraints", "constraint", "rules"],
    ),
    (ExtractionTask::EdgeCases, &["edge_cases", "edgeCases"]),
];

const LIST_FIELDS: [&str; 3] = ["endpoints", "authentication", "rate_limits"];

/// Normalize a decoded payload for the given task
pub fn normalize(task: ExtractionTask, payload: Value) -> Value {
    match task {
        ExtractionTask::Schema => normalize_schema(payload),
        _ => normalize_list(task, payload),
    }
}

/// Map a free-text authentication type onto the canonical set
///
/// Exact match first, then the synonym table, then substring heuristics;
/// anything unrecognised is `custom`.
pub fn normalize_auth_type(raw: &str) -> &'static str {
    let lowered = raw.trim().to_lowercase();

    if let Some(exact) = AUTH_TYPES.iter().copied().find(|t| *t == lowered) {
        return exact;
    }
    if let Some(canonical) = AUTH_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| *canonical)
    {
        return canonical;
    }

    if lowered.contains("bearer") || lowered.contains("token") {
        "bearer"
    } else if lowered.contains("basic") || lowered.contains("digest") {
        "basic"
    } else if lowered.contains("oauth") {
        "oauth2"
    } else if lowered.contains("api") && lowered.contains("key") {
        "api_key"
    } else {
        "custom"
    }
}

fn normalize_schema(payload: Value) -> Value {
    let mut schema = match payload {
        Value::Object(mut map) => {
            if !map.contains_key("endpoints") && matches!(map.get("schema"), Some(Value::Object(_))) {
                match map.remove("schema") {
                    Some(Value::Object(inner)) => inner,
                    _ => map,
                }
            } else {
                map
            }
        }
        // the validator reports the wrong shape
        other => return other,
    };

    for field in LIST_FIELDS {
        if matches!(schema.get(field), Some(Value::Null)) {
            schema.remove(field);
        }
    }

    if let Some(auth) = schema.get_mut("authentication") {
        wrap_single(auth);
        for_each_object(auth, normalize_auth);
    }
    if let Some(limits) = schema.get_mut("rate_limits") {
        wrap_single(limits);
        for_each_object(limits, normalize_rate_limit);
    }
    if let Some(endpoints) = schema.get_mut("endpoints") {
        for_each_object(endpoints, normalize_endpoint);
    }

    Value::Object(schema)
}

fn normalize_auth(auth: &mut Map<String, Value>) {
    let raw_type = auth.get("type").and_then(Value::as_str).unwrap_or("").to_string();
    let canonical = normalize_auth_type(&raw_type);
    if raw_type != canonical {
        debug!(raw = %raw_type, canonical, "Normalized authentication type");
    }
    auth.insert("type".to_string(), Value::from(canonical));

    let has_name = auth
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|n| !n.trim().is_empty());
    if !has_name {
        auth.insert("name".to_string(), Value::from(auth_label(canonical)));
    }
}

/// Label for a canonical auth type
fn auth_label(auth_type: &str) -> String {
    match AUTH_LABELS.iter().find(|(t, _)| *t == auth_type) {
        Some((_, label)) => label.to_string(),
        None => format!("{} Authentication", title_case(auth_type)),
    }
}

fn title_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn normalize_rate_limit(limit: &mut Map<String, Value>) {
    if !limit.contains_key("requests") {
        if let Some(value) = limit.remove("limit") {
            limit.insert("requests".to_string(), value);
        }
    }

    let requests = match limit.get("requests") {
        Some(value) => match coerce_u64(value) {
            Some(n) => n,
            None => {
                warn!(value = %value, "Rate limit requests is not an integer, defaulting to 1");
                1
            }
        },
        None => {
            warn!("Rate limit without requests count, defaulting to 1");
            1
        }
    };
    limit.insert("requests".to_string(), Value::from(requests));
}

fn normalize_endpoint(endpoint: &mut Map<String, Value>) {
    if let Some(Value::String(method)) = endpoint.get_mut("method") {
        *method = method.trim().to_uppercase();
    }
    if let Some(responses) = endpoint.get_mut("responses") {
        for_each_object(responses, normalize_response);
    }
}

fn normalize_response(response: &mut Map<String, Value>) {
    let code = match response.get("status_code") {
        Some(text @ Value::String(_)) => coerce_u64(text),
        Some(_) => None,
        None => response.get("status").and_then(coerce_u64),
    };
    if let Some(code) = code {
        response.insert("status_code".to_string(), Value::from(code));
    }
}

fn normalize_list(task: ExtractionTask, payload: Value) -> Value {
    let map = match payload {
        Value::Array(items) => return Value::Array(items),
        Value::Object(map) => map,
        other => {
            warn!(task = %task, kind = %json_kind(&other), "Expected a list, using an empty one");
            return Value::Array(Vec::new());
        }
    };

    let alternates = ALT_KEYS
        .iter()
        .find(|(t, _)| *t == task)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[]);
    for key in alternates {
        if let Some(Value::Array(items)) = map.get(*key) {
            debug!(task = %task, key, "Unwrapped list from object");
            return Value::Array(items.clone());
        }
    }

    if task == ExtractionTask::FieldMappings
        && map.contains_key("carrier_field")
        && map.contains_key("universal_field")
    {
        return Value::Array(vec![Value::Object(map)]);
    }

    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    warn!(task = %task, keys = ?keys, "No list found in model output, using an empty one");
    Value::Array(Vec::new())
}

fn wrap_single(value: &mut Value) {
    if value.is_object() {
        let single = value.take();
        *value = Value::Array(vec![single]);
    }
}

fn for_each_object(value: &mut Value, f: impl Fn(&mut Map<String, Value>)) {
    if let Value::Array(items) = value {
        for item in items.iter_mut() {
            if let Value::Object(map) = item {
                f(map);
            }
        }
    }
}

fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_type_exact_and_synonyms() {
        assert_eq!(normalize_auth_type("OAuth2"), "oauth2");
        assert_eq!(normalize_auth_type(" bearer "), "bearer");
        assert_eq!(normalize_auth_type("JWT"), "bearer");
        assert_eq!(normalize_auth_type("Digest"), "basic");
        assert_eq!(normalize_auth_type("API-Key"), "api_key");
        assert_eq!(normalize_auth_type("SOAP"), "custom");
        assert_eq!(normalize_auth_type("WS-Security"), "custom");
        assert_eq!(normalize_auth_type("username_token"), "custom");
    }

    #[test]
    fn test_auth_type_heuristics() {
        assert_eq!(normalize_auth_type("Access Token header"), "bearer");
        assert_eq!(normalize_auth_type("HTTP Basic over TLS"), "basic");
        assert_eq!(normalize_auth_type("OAuth client credentials"), "oauth2");
        assert_eq!(normalize_auth_type("Partner API key"), "api_key");
        assert_eq!(normalize_auth_type("mutual TLS"), "custom");
        assert_eq!(normalize_auth_type(""), "custom");
    }

    #[test]
    fn test_ws_security_gets_custom_type_and_name() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"authentication": [{"type": "WS-Security"}]}),
        );
        let auth = &out["authentication"][0];
        assert_eq!(auth["type"], "custom");
        assert_eq!(auth["name"], "Custom Authentication");
    }

    #[test]
    fn test_auth_name_from_label_table() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"authentication": [{"type": "api_key"}, {"type": "bearer", "name": "  "}, {}]}),
        );
        assert_eq!(out["authentication"][0]["name"], "API Key Authentication");
        assert_eq!(out["authentication"][1]["name"], "Bearer Token Authentication");
        assert_eq!(out["authentication"][2]["type"], "custom");
        assert_eq!(out["authentication"][2]["name"], "Custom Authentication");
    }

    #[test]
    fn test_existing_auth_name_is_kept() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"authentication": {"type": "JWT", "name": "Portal token"}}),
        );
        assert_eq!(out["authentication"], json!([{"type": "bearer", "name": "Portal token"}]));
    }

    #[test]
    fn test_rate_limit_coercion() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"rate_limits": [
                {"limit": 100, "period": "1 minute"},
                {"requests": "250", "period": "1 hour"},
                {"requests": 12.7, "period": "1 second"},
                {"requests": "lots", "period": "1 day"},
                {"period": "1 week"}
            ]}),
        );
        let requests: Vec<&Value> = out["rate_limits"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| &l["requests"])
            .collect();
        assert_eq!(requests, vec![&json!(100), &json!(250), &json!(12), &json!(1), &json!(1)]);
        assert!(out["rate_limits"][0].get("limit").is_none());
    }

    #[test]
    fn test_requests_preferred_over_limit() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"rate_limits": [{"requests": 5, "limit": 10, "period": "1s"}]}),
        );
        assert_eq!(out["rate_limits"][0]["requests"], 5);
        assert_eq!(out["rate_limits"][0]["limit"], 10);
    }

    #[test]
    fn test_endpoint_method_and_status() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"endpoints": [{
                "path": "/track",
                "method": " get ",
                "responses": [
                    {"status": "200"},
                    {"status_code": "404"},
                    {"status": "OK"},
                    {"status": 201, "status_code": 202}
                ]
            }]}),
        );
        let endpoint = &out["endpoints"][0];
        assert_eq!(endpoint["method"], "GET");
        assert_eq!(endpoint["responses"][0]["status_code"], 200);
        assert_eq!(endpoint["responses"][1]["status_code"], 404);
        assert!(endpoint["responses"][2].get("status_code").is_none());
        assert_eq!(endpoint["responses"][3]["status_code"], 202);
    }

    #[test]
    fn test_schema_wrapper_and_null_lists() {
        let out = normalize(
            ExtractionTask::Schema,
            json!({"schema": {"name": "DHL", "endpoints": [], "rate_limits": null}}),
        );
        assert_eq!(out["name"], "DHL");
        assert!(out.get("rate_limits").is_none());
    }

    #[test]
    fn test_non_object_schema_is_untouched() {
        assert_eq!(normalize(ExtractionTask::Schema, json!([1])), json!([1]));
    }

    #[test]
    fn test_list_passthrough() {
        let list = json!([{"field": "weight"}]);
        assert_eq!(normalize(ExtractionTask::Constraints, list.clone()), list);
    }

    #[test]
    fn test_alternate_keys_in_order() {
        let out = normalize(
            ExtractionTask::FieldMappings,
            json!({"mappings": [{"carrier_field": "b"}], "fieldMappings": [{"carrier_field": "a"}]}),
        );
        assert_eq!(out, json!([{"carrier_field": "a"}]));

        let out = normalize(ExtractionTask::EdgeCases, json!({"edgeCases": [{"type": "surcharge"}]}));
        assert_eq!(out, json!([{"type": "surcharge"}]));

        let out = normalize(ExtractionTask::Constraints, json!({"rules": [1]}));
        assert_eq!(out, json!([1]));
    }

    #[test]
    fn test_single_mapping_is_wrapped() {
        let single = json!({"carrier_field": "trk_num", "universal_field": "tracking_number"});
        let out = normalize(ExtractionTask::FieldMappings, single.clone());
        assert_eq!(out, json!([single]));
    }

    #[test]
    fn test_unrecognised_map_becomes_empty_list() {
        let out = normalize(ExtractionTask::Constraints, json!({"notes": "none found"}));
        assert_eq!(out, json!([]));

        let out = normalize(ExtractionTask::EdgeCases, json!({"edge_cases": "none"}));
        assert_eq!(out, json!([]));

        assert_eq!(normalize(ExtractionTask::EdgeCases, Value::Null), json!([]));
    }

    #[test]
    fn test_auth_label() {
        assert_eq!(auth_label("oauth2"), "OAuth 2.0 Authentication");
        assert_eq!(auth_label("mutual_tls"), "Mutual Tls Authentication");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ws-security"), "Ws Security");
        assert_eq!(title_case("mutual_tls auth"), "Mutual Tls Auth");
    }
}
