//! Validator configuration

/// Configuration for validation rules
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Reject schemas without any endpoint
    pub require_endpoints: bool,

    /// Reject endpoints with an empty summary
    pub require_endpoint_summary: bool,

    /// Require `base_url` (and `documentation_url`, when present) to be http(s) URLs
    pub require_absolute_urls: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_endpoints: true,
            require_endpoint_summary: true,
            require_absolute_urls: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (structural decoding only)
    pub fn permissive() -> Self {
        Self {
            require_endpoints: false,
            require_endpoint_summary: false,
            require_absolute_urls: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.require_endpoints);
        assert!(config.require_endpoint_summary);
        assert!(config.require_absolute_urls);
    }

    #[test]
    fn test_permissive_config() {
        let config = ValidationConfig::permissive();
        assert!(!config.require_endpoints);
        assert!(!config.require_absolute_urls);
    }
}
