//! Carrierfmt CLI - Extract structured carrier data from API documentation.

use anyhow::Context;
use carrierfmt_cli::commands;
use carrierfmt_cli::{Cli, Command, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color_enabled = !cli.no_color;
    if !color_enabled {
        colored::control::set_override(false);
    }
    let formatter = Formatter::new(color_enabled);

    if let Err(e) = run(cli, &formatter).await {
        eprintln!("{}", formatter.error(&format!("{:#}", e)));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, formatter: &Formatter) -> anyhow::Result<()> {
    match cli.command {
        Command::Extract(args) => {
            let input = args.input.display().to_string();
            commands::execute_extract(args, formatter)
                .await
                .with_context(|| format!("Extraction of {} failed", input))?;
        }
    }
    Ok(())
}

/// Log to stderr; `-v` forces debug, otherwise `RUST_LOG` or info.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
