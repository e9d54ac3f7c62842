//! Configuration loading for the CLI.

use crate::error::Result;
use carrierfmt_extractor::ExtractorConfig;
use std::path::{Path, PathBuf};

/// Build the extractor configuration for one invocation.
///
/// Precedence, lowest first: defaults, the TOML file, environment
/// variables, `--max-chars`.
pub fn load_config(file: Option<&Path>, max_chars: Option<i64>) -> Result<ExtractorConfig> {
    load_config_with(file, max_chars, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit variable lookup.
pub fn load_config_with<F>(file: Option<&Path>, max_chars: Option<i64>, lookup: F) -> Result<ExtractorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match file {
        Some(path) => ExtractorConfig::from_file(path)?,
        None => ExtractorConfig::default(),
    };

    let mut config = config.apply_overrides(lookup);
    if let Some(max) = max_chars {
        config.max_chars_per_chunk = max;
    }
    config.validate()?;
    Ok(config)
}

/// Artifact path used when `--output` is not given: the input with a `.json` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("json")
}
