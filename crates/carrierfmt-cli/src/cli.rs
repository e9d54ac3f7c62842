//! CLI command definitions and argument parsing.

use carrierfmt_domain::ExtractionTask;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Carrierfmt - Extract structured carrier integration data from API documentation.
#[derive(Debug, Parser)]
#[command(name = "carrierfmt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract schema, field mappings, constraints and edge cases from a document
    Extract(ExtractArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Plain-text carrier documentation
    pub input: PathBuf,

    /// Output file (defaults to the input path with a .json extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extractor configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model name (overrides LLM_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum chunk size; 0 disables chunking
    #[arg(long, allow_hyphen_values = true)]
    pub max_chars: Option<i64>,

    /// Which task to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub task: TaskArg,
}

/// Task selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TaskArg {
    /// All four tasks, written as one artifact
    All,
    /// API schema only
    Schema,
    /// Field mappings only
    #[value(name = "field_mappings")]
    FieldMappings,
    /// Constraints only
    Constraints,
    /// Edge cases only
    #[value(name = "edge_cases")]
    EdgeCases,
}

impl TaskArg {
    /// The single task selected, or `None` for a full document run
    pub fn single(self) -> Option<ExtractionTask> {
        match self {
            TaskArg::All => None,
            TaskArg::Schema => Some(ExtractionTask::Schema),
            TaskArg::FieldMappings => Some(ExtractionTask::FieldMappings),
            TaskArg::Constraints => Some(ExtractionTask::Constraints),
            TaskArg::EdgeCases => Some(ExtractionTask::EdgeCases),
        }
    }
}
