//! Carrierfmt Validator
//!
//! The gate every schema partial must pass before it can be merged.
//!
//! The validator provides:
//! - The typed Universal Carrier Format model (`CarrierSchema` and friends)
//! - Structural decoding of a normalized JSON map into that model
//! - Semantic checks (path format, status code range, positive rate limits)
//! - Field-path-qualified error reporting (`endpoints[2].method: ...`)
//!
//! # Examples
//!
//! ```
//! use carrierfmt_validator::{CarrierValidator, ValidationConfig};
//! use serde_json::json;
//!
//! let validator = CarrierValidator::new(ValidationConfig::default());
//! let schema = validator.validate(&json!({
//!     "name": "Example Carrier",
//!     "base_url": "https://api.example.com",
//!     "endpoints": [{"path": "/track", "method": "GET", "summary": "Track"}]
//! })).unwrap();
//! assert_eq!(schema.endpoints.len(), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod model;
mod validator;

pub use config::ValidationConfig;
pub use error::{FieldIssue, ValidationError};
pub use model::{
    AuthLocation, AuthType, AuthenticationMethod, CarrierSchema, Endpoint, HttpMethod,
    Parameter, ParameterLocation, ParameterType, RateLimit, RequestSchema, ResponseSchema,
};
pub use validator::CarrierValidator;
