//! Output formatting for the CLI.

use carrierfmt_domain::{ProgressEvent, ProgressObserver};
use carrierfmt_extractor::{ExtractionOutput, MergedResult};
use colored::*;
use std::path::Path;

/// Output formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Summary of a full document run.
    pub fn document_summary(&self, output: &ExtractionOutput, artifact: &Path) -> String {
        let schema = &output.schema;
        let mut lines = vec![self.success(&format!("Extracted {} ({})", schema.name, schema.base_url))];
        lines.push(format!("  {:<16}{}", "endpoints", schema.endpoints.len()));
        lines.push(format!("  {:<16}{}", "authentication", schema.authentication.len()));
        lines.push(format!("  {:<16}{}", "rate limits", schema.rate_limits.len()));
        lines.push(format!("  {:<16}{}", "field mappings", output.field_mappings.len()));
        lines.push(format!("  {:<16}{}", "constraints", output.constraints.len()));
        lines.push(format!("  {:<16}{}", "edge cases", output.edge_cases.len()));

        let chunks: Vec<String> = output
            .metadata
            .chunks_per_task
            .iter()
            .map(|(task, n)| format!("{}={}", task, n))
            .collect();
        lines.push(self.info(&format!(
            "{} in {} ms, chunks: {}",
            output.metadata.llm_model,
            output.metadata.processing_time_ms,
            chunks.join(" ")
        )));
        lines.push(self.success(&format!("Wrote {}", artifact.display())));
        lines.join("\n")
    }

    /// One-line summary of a single-task run.
    pub fn task_summary(&self, merged: &MergedResult) -> String {
        let noun = match merged {
            MergedResult::Schema(_) => "endpoint(s)",
            _ => "item(s)",
        };
        let message = format!("{}: {} {}", merged.task(), merged.item_count(), noun);
        if merged.item_count() == 0 {
            self.warning(&message)
        } else {
            self.success(&message)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }

    fn progress_line(&self, event: &ProgressEvent) -> String {
        match event {
            ProgressEvent::TaskStarted { task, total_chunks } => {
                self.colorize(&format!("▶ {} ({} chunk(s))", task, total_chunks), "cyan")
            }
            ProgressEvent::ChunkStarted {
                task,
                index,
                total,
                size,
            } => format!("  {} chunk {}/{} ({} chars)", task, index + 1, total, size),
            ProgressEvent::TaskFinished { task, items } => format!("  {} done: {} item(s)", task, items),
        }
    }
}

/// Renders progress events on stderr.
pub struct ProgressPrinter {
    formatter: Formatter,
}

impl ProgressPrinter {
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }
}

impl ProgressObserver for ProgressPrinter {
    fn on_event(&self, event: &ProgressEvent) {
        eprintln!("{}", self.formatter.progress_line(event));
    }
}
