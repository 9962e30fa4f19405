//! Featsweep CLI - batch analysis of features
//!
//! Resolves feature indices, ranges and list files into one queue and runs
//! the analysis job for each feature in turn, skipping features whose output
//! already exists.

mod commands;
mod config;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use commands::analyze::{self, AnalyzeOptions};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const AFTER_HELP: &str = "\
Examples:
  # Analyze specific features
  featsweep 16751 20379 11328

  # Analyze a range of features
  featsweep 16000-16010

  # Analyze features from a file (one per line)
  featsweep my_features.txt

  # Force re-analysis of existing files
  featsweep 16751 --force

  # Custom output directory
  featsweep 16751 --output-dir results/";

/// Featsweep - batch analysis of features
#[derive(Parser, Debug)]
#[command(
    name = "featsweep",
    author,
    version,
    about = "Batch analyze features",
    after_help = AFTER_HELP,
    allow_negative_numbers = true
)]
struct Args {
    /// Feature indices, ranges (e.g., 100-200), or file paths
    #[arg(required = true, value_name = "FEATURES")]
    features: Vec<String>,

    /// Output directory (default: output/)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Re-analyze even if output file exists
    #[arg(long)]
    force: bool,

    /// Show what would be analyzed or skipped without running anything
    #[arg(long)]
    dry_run: bool,

    /// Print the summary (or plan) as JSON
    #[arg(long)]
    json: bool,

    /// Config file (merged over ~/.featsweep/config.toml and ./.featsweeprc)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn parse_level(level: &str) -> Level {
    match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Handle completion generation
    if let Ok(shell) = std::env::var("FEATSWEEP_GENERATE_COMPLETIONS") {
        let mut cmd = Args::command();
        match shell.as_str() {
            "bash" => generate(shells::Bash, &mut cmd, "featsweep", &mut std::io::stdout()),
            "zsh" => generate(shells::Zsh, &mut cmd, "featsweep", &mut std::io::stdout()),
            "fish" => generate(shells::Fish, &mut cmd, "featsweep", &mut std::io::stdout()),
            "powershell" => generate(shells::PowerShell, &mut cmd, "featsweep", &mut std::io::stdout()),
            "elvish" => generate(shells::Elvish, &mut cmd, "featsweep", &mut std::io::stdout()),
            _ => {
                eprintln!("Unknown shell: {}. Supported: bash, zsh, fish, powershell, elvish", shell);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let args = Args::parse();

    // Initialize tracing before any config file is read
    let level = args
        .log_level
        .clone()
        .or_else(|| std::env::var(config::ENV_LOG_LEVEL).ok())
        .map_or(Level::WARN, |l| parse_level(&l.to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    analyze::execute(AnalyzeOptions {
        features: args.features,
        output_dir: args.output_dir,
        force: args.force,
        dry_run: args.dry_run,
        json: args.json,
        config: args.config,
    })
    .await
}
