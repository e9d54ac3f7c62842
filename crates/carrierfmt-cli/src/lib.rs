//! Carrierfmt CLI library.
//!
//! Argument parsing, configuration loading, the extract command and
//! terminal output for the `carrierfmt` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use output::Formatter;
