//! Configuration for the Extractor

use crate::error::{ChunkingError, ExtractorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding `task_timeout_secs`
pub const TIMEOUT_ENV: &str = "EXTRACT_TIMEOUT_SECONDS";

/// Environment variable overriding `max_chars_per_chunk`
pub const MAX_CHARS_ENV: &str = "LLM_MAX_CHARS_PER_CHUNK";

/// Upper bound for `retry_base_secs`
pub const MAX_RETRY_BASE_SECS: f64 = 3600.0;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size in bytes (0 or negative disables chunking)
    pub max_chars_per_chunk: i64,

    /// Bytes shared between consecutive chunks
    pub chunk_overlap_chars: usize,

    /// Total attempts per model invocation
    pub max_retries: u32,

    /// Backoff base in seconds (delay before retry n is `base * 2^n`)
    pub retry_base_secs: f64,

    /// Timeout wrapping one whole task (0 disables)
    pub task_timeout_secs: u64,

    /// Prefix length of the canonical fingerprint used to deduplicate
    /// constraints and edge cases
    pub fingerprint_len: usize,

    /// Where to dump responses that could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_dump_dir: Option<PathBuf>,
}

impl ExtractorConfig {
    /// Get the task timeout as a Duration, if one is configured
    pub fn task_timeout(&self) -> Option<Duration> {
        (self.task_timeout_secs > 0).then(|| Duration::from_secs(self.task_timeout_secs))
    }

    /// Get the backoff base as a Duration
    pub fn retry_base(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_base_secs.clamp(0.0, MAX_RETRY_BASE_SECS))
            .unwrap_or(Duration::ZERO)
    }

    /// Whether long texts are split at all
    pub fn chunking_enabled(&self) -> bool {
        self.max_chars_per_chunk > 0
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.chunking_enabled() && self.chunk_overlap_chars as i64 >= self.max_chars_per_chunk {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: self.chunk_overlap_chars,
                max: self.max_chars_per_chunk,
            }
            .into());
        }
        if self.max_retries == 0 {
            return Err(ExtractorError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if !(0.0..=MAX_RETRY_BASE_SECS).contains(&self.retry_base_secs) {
            return Err(ExtractorError::Config(format!(
                "retry_base_secs must be between 0 and {}, got {}",
                MAX_RETRY_BASE_SECS, self.retry_base_secs
            )));
        }
        if self.fingerprint_len == 0 {
            return Err(ExtractorError::Config(
                "fingerprint_len must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_chars_per_chunk: 100_000,
            chunk_overlap_chars: 500,
            max_retries: 3,
            retry_base_secs: 1.0,
            task_timeout_secs: 300,
            fingerprint_len: 500,
            debug_dump_dir: None,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: smaller chunks, fewer retries, shorter timeout
    pub fn aggressive() -> Self {
        Self {
            max_chars_per_chunk: 30_000,
            chunk_overlap_chars: 200,
            max_retries: 2,
            retry_base_secs: 0.5,
            task_timeout_secs: 120,
            ..Self::default()
        }
    }

    /// Lenient preset: larger chunks, more retries, longer timeout
    pub fn lenient() -> Self {
        Self {
            max_chars_per_chunk: 200_000,
            chunk_overlap_chars: 1_000,
            max_retries: 5,
            retry_base_secs: 2.0,
            task_timeout_secs: 900,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Apply `EXTRACT_TIMEOUT_SECONDS` and `LLM_MAX_CHARS_PER_CHUNK`
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Invalid values are ignored with a warning.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.task_timeout_secs = secs,
                _ => warn!(var = TIMEOUT_ENV, value = %raw, "Ignoring invalid timeout override"),
            }
        }
        if let Some(raw) = lookup(MAX_CHARS_ENV) {
            match raw.trim().parse::<i64>() {
                Ok(max) => self.max_chars_per_chunk = max,
                Err(_) => warn!(var = MAX_CHARS_ENV, value = %raw, "Ignoring invalid chunk size override"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_chars_per_chunk, 100_000);
        assert_eq!(config.chunk_overlap_chars, 500);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base(), Duration::from_secs(1));
    }

    #[test]
    fn test_aggressive_config_is_valid() {
        let config = ExtractorConfig::aggressive();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lenient_config_is_valid() {
        let config = ExtractorConfig::lenient();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        let config = ExtractorConfig {
            max_chars_per_chunk: 100,
            chunk_overlap_chars: 100,
            ..ExtractorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Chunking(_))));
    }

    #[test]
    fn test_overlap_ignored_when_chunking_disabled() {
        let config = ExtractorConfig {
            max_chars_per_chunk: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.chunking_enabled());
    }

    #[test]
    fn test_invalid_retry_settings() {
        let mut config = ExtractorConfig::default();
        config.max_retries = 0;
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));

        let mut config = ExtractorConfig::default();
        config.retry_base_secs = f64::NAN;
        assert!(config.validate().is_err());

        config.retry_base_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_retry_base_rejected() {
        let config = ExtractorConfig::from_toml("retry_base_secs = 1e30\n").unwrap();
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
        assert_eq!(config.retry_base(), Duration::from_secs(3600));

        let mut config = ExtractorConfig::default();
        config.retry_base_secs = f64::INFINITY;
        assert!(config.validate().is_err());
        config.retry_base_secs = MAX_RETRY_BASE_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_zero_disables() {
        let mut config = ExtractorConfig::default();
        assert_eq!(config.task_timeout(), Some(Duration::from_secs(300)));
        config.task_timeout_secs = 0;
        assert_eq!(config.task_timeout(), None);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("max_chars_per_chunk = 5000\n").unwrap();
        assert_eq!(parsed.max_chars_per_chunk, 5000);
        assert_eq!(parsed.chunk_overlap_chars, 500);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(TIMEOUT_ENV, "42"), (MAX_CHARS_ENV, "-1")].into_iter().collect();
        let config = ExtractorConfig::default().apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.task_timeout_secs, 42);
        assert_eq!(config.max_chars_per_chunk, -1);
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let vars: HashMap<&str, &str> = [(TIMEOUT_ENV, "0"), (MAX_CHARS_ENV, "lots")].into_iter().collect();
        let config = ExtractorConfig::default().apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.task_timeout_secs, 300);
        assert_eq!(config.max_chars_per_chunk, 100_000);
    }
}
