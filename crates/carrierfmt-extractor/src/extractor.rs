//! Core Extractor implementation

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::invoker::{ExtractionInvoker, RetryPolicy, Sleeper};
use crate::merger::ResultMerger;
use crate::normalizer::normalize;
use crate::prompt::{prompt_versions, PromptParams};
use crate::sanitizer::extract_json;
use crate::types::{ExtractionMetadata, ExtractionOutput, MergedResult, PartialResult};
use carrierfmt_domain::traits::LlmProvider;
use carrierfmt_domain::{ExtractionTask, NoopObserver, ProgressEvent, ProgressObserver, RunId, TextChunk};
use carrierfmt_llm::LlmError;
use carrierfmt_validator::CarrierValidator;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// The Extractor turns carrier documentation into merged, validated results
///
/// Chunks of one task are processed strictly in order; the first
/// unrecoverable failure aborts the task and nothing is merged.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    invoker: ExtractionInvoker<L>,
    validator: CarrierValidator,
    config: ExtractorConfig,
    observer: Arc<dyn ProgressObserver>,
}

impl<L> Extractor<L>
where
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    /// Create a new Extractor
    ///
    /// Fails if the configuration is invalid.
    pub fn new(
        llm_provider: L,
        validator: CarrierValidator,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;
        let llm_provider = Arc::new(llm_provider);
        let policy = RetryPolicy::new(config.max_retries, config.retry_base());
        Ok(Self {
            invoker: ExtractionInvoker::new(Arc::clone(&llm_provider), policy),
            llm_provider,
            validator,
            config,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Report progress events to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the backoff sleeper
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.invoker = self.invoker.with_sleeper(sleeper);
        self
    }

    /// Replace the retry classifier
    pub fn with_retry_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&LlmError) -> bool + Send + Sync + 'static,
    {
        self.invoker = self.invoker.with_classifier(classifier);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the provider
    pub fn model_name(&self) -> &str {
        self.llm_provider.model_name()
    }

    /// Split `text` the way `run` will
    ///
    /// Text within the configured limit (or any text, when chunking is
    /// disabled) is a single implicit chunk.
    pub fn chunks(&self, text: &str) -> Vec<TextChunk> {
        if self.config.chunking_enabled() && text.len() as u64 > self.config.max_chars_per_chunk as u64 {
            TextChunker::from_config(&self.config).split(text)
        } else {
            vec![TextChunk::whole(text)]
        }
    }

    /// Run one task over the full text and merge its chunk results
    pub async fn run(
        &self,
        task: ExtractionTask,
        text: &str,
        params: &PromptParams,
    ) -> Result<MergedResult, ExtractorError> {
        self.run_with_timeout(task, text, params)
            .await
            .map(|(merged, _)| merged)
    }

    /// Run all four tasks over one document
    ///
    /// The schema task runs first so its carrier name can be passed to the
    /// field-mappings prompt. Any task failure aborts the document.
    pub async fn run_document(&self, text: &str) -> Result<ExtractionOutput, ExtractorError> {
        let started = Instant::now();
        let run_id = RunId::new();
        info!(run_id = %run_id, text_len = text.len(), model = %self.model_name(), "Starting document extraction");

        let mut chunks_per_task = BTreeMap::new();

        let (merged, chunks) = self
            .run_with_timeout(ExtractionTask::Schema, text, &PromptParams::default())
            .await?;
        chunks_per_task.insert(ExtractionTask::Schema.as_str().to_string(), chunks);
        let schema = merged
            .into_schema()
            .ok_or(ExtractorError::ShapeMismatch(ExtractionTask::Schema))?;

        let params = PromptParams::with_carrier_name(schema.name.clone());
        let field_mappings = self
            .run_list(ExtractionTask::FieldMappings, text, &params, &mut chunks_per_task)
            .await?;
        let constraints = self
            .run_list(ExtractionTask::Constraints, text, &params, &mut chunks_per_task)
            .await?;
        let edge_cases = self
            .run_list(ExtractionTask::EdgeCases, text, &params, &mut chunks_per_task)
            .await?;

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            endpoints = schema.endpoints.len(),
            field_mappings = field_mappings.len(),
            constraints = constraints.len(),
            edge_cases = edge_cases.len(),
            processing_time_ms,
            "Document extraction complete"
        );

        Ok(ExtractionOutput {
            schema,
            field_mappings,
            constraints,
            edge_cases,
            metadata: ExtractionMetadata {
                run_id: run_id.to_string(),
                llm_model: self.model_name().to_string(),
                chunks_per_task,
                prompt_versions: prompt_versions(),
                processing_time_ms,
                extracted_at: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0),
            },
        })
    }

    async fn run_list(
        &self,
        task: ExtractionTask,
        text: &str,
        params: &PromptParams,
        chunks_per_task: &mut BTreeMap<String, usize>,
    ) -> Result<Vec<Value>, ExtractorError> {
        let (merged, chunks) = self.run_with_timeout(task, text, params).await?;
        chunks_per_task.insert(task.as_str().to_string(), chunks);
        merged.into_list().ok_or(ExtractorError::ShapeMismatch(task))
    }

    async fn run_with_timeout(
        &self,
        task: ExtractionTask,
        text: &str,
        params: &PromptParams,
    ) -> Result<(MergedResult, usize), ExtractorError> {
        let Some(limit) = self.config.task_timeout() else {
            return self.run_chunks(task, text, params).await;
        };

        match tokio::time::timeout(limit, self.run_chunks(task, text, params)).await {
            Ok(result) => result,
            Err(_) => {
                error!(task = %task, secs = limit.as_secs(), "Task timed out");
                Err(ExtractorError::Timeout {
                    task,
                    secs: limit.as_secs(),
                })
            }
        }
    }

    async fn run_chunks(
        &self,
        task: ExtractionTask,
        text: &str,
        params: &PromptParams,
    ) -> Result<(MergedResult, usize), ExtractorError> {
        let chunks = self.chunks(text);
        let total = chunks.len();
        let chunked = total > 1;

        info!(task = %task, chunks = total, text_len = text.len(), "Starting task");
        self.observer.on_event(&ProgressEvent::TaskStarted {
            task,
            total_chunks: total,
        });

        let mut partials = Vec::with_capacity(total);
        for chunk in &chunks {
            self.observer.on_event(&ProgressEvent::ChunkStarted {
                task,
                index: chunk.index,
                total,
                size: chunk.len(),
            });
            debug!(task = %task, chunk = chunk.index, size = chunk.len(), "Processing chunk");

            let partial = self
                .process_chunk(task, chunk, params)
                .await
                .map_err(|e| e.in_task(task, chunked.then_some(chunk.index)))?;
            partials.push(partial);
        }

        let merged = ResultMerger::new(&self.validator, self.config.fingerprint_len)
            .merge(task, partials)
            .map_err(|e| e.in_task(task, None))?;

        let items = merged.item_count();
        info!(task = %task, items, "Task complete");
        self.observer.on_event(&ProgressEvent::TaskFinished { task, items });
        Ok((merged, total))
    }

    /// invoke → sanitize → normalize → validate (schema only)
    async fn process_chunk(
        &self,
        task: ExtractionTask,
        chunk: &TextChunk,
        params: &PromptParams,
    ) -> Result<PartialResult, ExtractorError> {
        let raw = self.invoker.invoke(task, &chunk.text, params).await?;

        let payload = match extract_json(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(task = %task, chunk = chunk.index, error = %e, "Could not recover JSON from model output");
                self.dump_response(task, chunk.index, &raw);
                return Err(e.into());
            }
        };

        let value = normalize(task, payload.into_value());
        if task == ExtractionTask::Schema {
            return Ok(PartialResult::Schema(self.validator.validate(&value)?));
        }
        match value {
            Value::Array(items) => Ok(PartialResult::List(items)),
            _ => Err(ExtractorError::ShapeMismatch(task)),
        }
    }

    /// Best-effort copy of an unparseable response for postmortem inspection
    fn dump_response(&self, task: ExtractionTask, chunk: usize, raw: &str) {
        let Some(dir) = &self.config.debug_dump_dir else {
            return;
        };
        let path = dir.join(format!("llm_response_{}_{}.txt", task, chunk));
        let written = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, raw));
        match written {
            Ok(()) => info!(path = %path.display(), "Saved failing model response"),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not save failing model response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrierfmt_llm::MockProvider;
    use carrierfmt_validator::ValidationConfig;
    use std::time::Duration;

    fn create_test_extractor(llm: MockProvider) -> Extractor<MockProvider> {
        Extractor::new(llm, CarrierValidator::default_config(), ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ExtractorConfig {
            max_retries: 0,
            ..ExtractorConfig::default()
        };
        let result = Extractor::new(MockProvider::new("[]"), CarrierValidator::default_config(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_out_of_range_retry_base_is_rejected() {
        let config = ExtractorConfig {
            retry_base_secs: 1e30,
            ..ExtractorConfig::default()
        };
        let result = Extractor::new(MockProvider::new("[]"), CarrierValidator::default_config(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let extractor = create_test_extractor(MockProvider::new("[]"));
        let chunks = extractor.chunks("short text");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
    }

    #[test]
    fn test_disabled_chunking_keeps_long_text_whole() {
        let config = ExtractorConfig {
            max_chars_per_chunk: 0,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(MockProvider::new("[]"), CarrierValidator::default_config(), config).unwrap();
        assert_eq!(extractor.chunks(&"x".repeat(300_000)).len(), 1);
    }

    #[tokio::test]
    async fn test_extract_empty_list() {
        let extractor = create_test_extractor(MockProvider::new("[]"));
        let merged = extractor
            .run(ExtractionTask::Constraints, "Some text", &PromptParams::default())
            .await
            .unwrap();
        assert_eq!(merged, MergedResult::Constraints(vec![]));
    }

    #[tokio::test]
    async fn test_single_chunk_error_has_no_chunk_index() {
        let extractor = create_test_extractor(MockProvider::new("This is not JSON"));
        let err = extractor
            .run(ExtractionTask::EdgeCases, "Some text", &PromptParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Task { chunk: None, .. }));
        assert!(matches!(err.root_cause(), ExtractorError::Parse(_)));
        assert!(err.to_string().starts_with("Task edge_cases failed:"));
    }

    #[tokio::test]
    async fn test_schema_validation_failure_aborts() {
        let extractor = create_test_extractor(MockProvider::new(r#"{"name": "C", "base_url": "https://c.com", "endpoints": []}"#));
        let err = extractor
            .run(ExtractionTask::Schema, "docs", &PromptParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err.root_cause(), ExtractorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_permissive_validator_accepts_empty_schema() {
        let extractor = Extractor::new(
            MockProvider::new(r#"{"name": "C", "base_url": "https://c.com"}"#),
            CarrierValidator::new(ValidationConfig::permissive()),
            ExtractorConfig::default(),
        )
        .unwrap();
        let schema = extractor
            .run(ExtractionTask::Schema, "docs", &PromptParams::default())
            .await
            .unwrap()
            .into_schema()
            .unwrap();
        assert_eq!(schema.name, "C");
        assert!(schema.endpoints.is_empty());
    }

    #[tokio::test]
    async fn test_debug_dump_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractorConfig {
            debug_dump_dir: Some(dir.path().join("dumps")),
            ..ExtractorConfig::default()
        };
        let extractor =
            Extractor::new(MockProvider::new("no json here"), CarrierValidator::default_config(), config).unwrap();

        assert!(extractor
            .run(ExtractionTask::Constraints, "docs", &PromptParams::default())
            .await
            .is_err());

        let dumped = std::fs::read_to_string(dir.path().join("dumps").join("llm_response_constraints_0.txt")).unwrap();
        assert_eq!(dumped, "no json here");
    }

    struct SlowProvider;

    impl LlmProvider for SlowProvider {
        type Error = LlmError;

        fn generate(&self, _prompt: &carrierfmt_domain::Prompt) -> Result<String, Self::Error> {
            std::thread::sleep(Duration::from_millis(1_500));
            Ok("[]".to_string())
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_task_timeout() {
        let config = ExtractorConfig {
            task_timeout_secs: 1,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(SlowProvider, CarrierValidator::default_config(), config).unwrap();
        let err = extractor
            .run(ExtractionTask::Constraints, "docs", &PromptParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Timeout { task: ExtractionTask::Constraints, secs: 1 }));
        assert_eq!(err.to_string(), "Task constraints timed out after 1s");
    }
}
