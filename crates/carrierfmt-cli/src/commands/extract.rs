//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::{default_output_path, load_config};
use crate::error::{CliError, Result};
use crate::output::{Formatter, ProgressPrinter};
use carrierfmt_domain::traits::LlmProvider;
use carrierfmt_extractor::{ExtractionArtifact, Extractor, ExtractorConfig, MergedResult, PromptParams};
use carrierfmt_llm::{LlmError, OpenAiProvider};
use carrierfmt_validator::CarrierValidator;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute the extract command against the configured provider.
pub async fn execute_extract(args: ExtractArgs, formatter: &Formatter) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.max_chars)?;
    let provider = OpenAiProvider::from_env(args.model.as_deref())?;
    extract_with(provider, config, &args, formatter).await
}

/// Run the extraction described by `args` with an explicit provider.
pub async fn extract_with<L>(
    provider: L,
    config: ExtractorConfig,
    args: &ExtractArgs,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    let text = std::fs::read_to_string(&args.input)?;
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput(format!("{} is empty", args.input.display())));
    }
    info!(input = %args.input.display(), bytes = text.len(), "Read documentation");

    let extractor = Extractor::new(provider, CarrierValidator::default_config(), config)?
        .with_observer(Arc::new(ProgressPrinter::new(*formatter)));

    match args.task.single() {
        None => {
            let output = extractor.run_document(&text).await?;
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| default_output_path(&args.input));
            let summary = formatter.document_summary(&output, &path);
            ExtractionArtifact::from_output(output).write_atomic(&path)?;
            println!("{}", summary);
        }
        Some(task) => {
            let merged = extractor.run(task, &text, &PromptParams::default()).await?;
            let json = serde_json::to_string_pretty(&merged_to_json(&merged)?)?;
            match &args.output {
                Some(path) => write_json(path, &json)?,
                None => println!("{}", json),
            }
            eprintln!("{}", formatter.task_summary(&merged));
        }
    }
    Ok(())
}

fn merged_to_json(merged: &MergedResult) -> Result<Value> {
    Ok(match merged {
        MergedResult::Schema(schema) => serde_json::to_value(schema)?,
        MergedResult::FieldMappings(items)
        | MergedResult::Constraints(items)
        | MergedResult::EdgeCases(items) => Value::Array(items.clone()),
    })
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{}\n", json))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::TaskArg;
    use carrierfmt_llm::MockProvider;
    use std::path::PathBuf;

    const SCHEMA: &str = r#"{"name": "DHL Express", "base_url": "https://express.api.dhl.com",
        "endpoints": [{"path": "/shipments", "method": "POST", "summary": "Create shipment"}]}"#;

    fn args(input: PathBuf, output: Option<PathBuf>, task: TaskArg) -> ExtractArgs {
        ExtractArgs {
            input,
            output,
            config: None,
            model: None,
            max_chars: None,
            task,
        }
    }

    fn mock() -> MockProvider {
        let llm = MockProvider::new("[]");
        llm.add_response_containing("Extract the API schema", SCHEMA);
        llm.add_response_containing(
            "extract field name mappings",
            r#"[{"carrier_field": "trk", "universal_field": "tracking_number"}]"#,
        );
        llm
    }

    #[tokio::test]
    async fn test_full_run_writes_artifact_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dhl.txt");
        std::fs::write(&input, "DHL Express API reference").unwrap();

        extract_with(mock(), ExtractorConfig::default(), &args(input, None, TaskArg::All), &Formatter::new(false))
            .await
            .unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("dhl.json")).unwrap()).unwrap();
        assert_eq!(written["schema_version"], "1.0.0");
        assert_eq!(written["schema"]["name"], "DHL Express");
        assert_eq!(written["field_mappings"].as_array().unwrap().len(), 1);
        assert_eq!(written["extraction_metadata"]["llm_model"], "mock");
    }

    #[tokio::test]
    async fn test_single_task_writes_plain_result() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dhl.txt");
        let output = dir.path().join("out").join("mappings.json");
        std::fs::write(&input, "DHL Express API reference").unwrap();

        extract_with(
            mock(),
            ExtractorConfig::default(),
            &args(input, Some(output.clone()), TaskArg::FieldMappings),
            &Formatter::new(false),
        )
        .await
        .unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written[0]["universal_field"], "tracking_number");
    }

    #[tokio::test]
    async fn test_failed_run_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dhl.txt");
        std::fs::write(&input, "DHL Express API reference").unwrap();
        let llm = mock();
        llm.add_response_containing("extract edge cases", "I could not find any.");

        let result = extract_with(llm, ExtractorConfig::default(), &args(input, None, TaskArg::All), &Formatter::new(false)).await;

        assert!(matches!(result, Err(CliError::Extractor(_))));
        assert!(!dir.path().join("dhl.json").exists());
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        std::fs::write(&input, "  \n").unwrap();

        let result = extract_with(mock(), ExtractorConfig::default(), &args(input, None, TaskArg::All), &Formatter::new(false)).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
