//! `cream-host`: run an editor session over stdin/stdout.
//!
//! ```text
//! $ printf '%s\n' '{"action":"editPlain","text":"Hello"}' | cream-host
//! {"action":"onEditorValueChanged","text":"Hello"}
//! ```
//!
//! Logs go to stderr; set `CREAM_LOG` (e.g. `CREAM_LOG=cream_core=trace`) to change the filter.

use anyhow::{Context, Result};
use clap::Parser;
use cream_core::EditorConfig;
use cream_host::HostRunner;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "cream-host")]
#[command(about = "Drive a cream editor session with JSON lines on stdin")]
struct Args {
    /// Editor configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging when CREAM_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EditorConfig::default(),
    };
    info!(config = ?args.config, "starting cream-host");

    let mut runner = HostRunner::new(&config);
    let summary = runner
        .run(io::stdin().lock(), io::stdout().lock())
        .context("session aborted")?;

    info!(lines = summary.lines, errors = summary.errors, "session finished");
    Ok(())
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CREAM_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
