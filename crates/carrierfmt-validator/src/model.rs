//! Universal Carrier Format model
//!
//! Every struct keeps unknown keys in `extra` so nothing the model extracted
//! is lost between decoding and serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request parameter appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterLocation {
    /// Query string
    Query,
    /// URL path segment
    Path,
    /// HTTP header
    Header,
    /// Request body
    Body,
    /// Form data
    FormData,
}

/// Parameter data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// String
    String,
    /// Integer
    Integer,
    /// Float/decimal
    Number,
    /// Boolean
    Boolean,
    /// Array
    Array,
    /// Object
    Object,
    /// Calendar date
    Date,
    /// Date and time
    Datetime,
}

/// A request parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Data type
    #[serde(rename = "type")]
    pub kind: ParameterType,

    /// Where the parameter appears
    pub location: ParameterLocation,

    /// Whether the parameter is required
    #[serde(default)]
    pub required: bool,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default value
    #[serde(default, rename = "default", alias = "default_value", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Example value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Allowed values
    #[serde(default, rename = "enum", alias = "enum_values", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

/// Request description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSchema {
    /// Request content type
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// JSON schema of the body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_schema: Option<Value>,

    /// Parameters
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A possible response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// HTTP status code (100-599)
    pub status_code: u16,

    /// Response content type
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// JSON schema of the body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_schema: Option<Value>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Path, starting with `/`
    pub path: String,

    /// HTTP method
    pub method: HttpMethod,

    /// Short summary
    #[serde(default)]
    pub summary: String,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Request description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSchema>,

    /// Possible responses
    #[serde(default)]
    pub responses: Vec<ResponseSchema>,

    /// Whether the endpoint requires authentication
    #[serde(default)]
    pub authentication_required: bool,

    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Endpoint {
    /// Identity used to deduplicate endpoints: (path, upper-case method)
    pub fn identity(&self) -> (String, &'static str) {
        (self.path.clone(), self.method.as_str())
    }
}

/// Closed set of authentication types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthType {
    /// API key
    #[serde(rename = "api_key")]
    ApiKey,
    /// Bearer token
    #[serde(rename = "bearer")]
    Bearer,
    /// HTTP basic
    #[serde(rename = "basic")]
    Basic,
    /// OAuth 2.0
    #[serde(rename = "oauth2")]
    OAuth2,
    /// Anything else
    #[serde(rename = "custom")]
    Custom,
}

/// Where an authentication credential is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLocation {
    /// HTTP header
    #[default]
    Header,
    /// Query string
    Query,
    /// Cookie
    Cookie,
}

/// An authentication method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationMethod {
    /// Authentication type
    #[serde(rename = "type")]
    pub kind: AuthType,

    /// Display name
    pub name: String,

    /// How to authenticate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Where the credential is sent
    #[serde(default)]
    pub location: AuthLocation,

    /// Scheme (e.g. "Bearer")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    /// Parameter name (e.g. "X-API-Key")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rate limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per period (> 0)
    pub requests: u64,

    /// Period (e.g. "1 minute")
    pub period: String,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The Universal Carrier Format schema of one carrier API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierSchema {
    /// Carrier name
    pub name: String,

    /// Base API URL
    pub base_url: String,

    /// API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Endpoints
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    /// Authentication methods
    #[serde(default)]
    pub authentication: Vec<AuthenticationMethod>,

    /// Rate limits
    #[serde(default)]
    pub rate_limits: Vec<RateLimit>,

    /// Link to the original documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// Unrecognised keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
