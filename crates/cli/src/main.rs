//! # rollbook-cli
//!
//! Command-line interface for consolidating class-roster workbooks.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rollbook_merge::{consolidate, discover_inputs, ConsolidationReport, MergeOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// rollbook - merge class rosters into one workbook
#[derive(Parser)]
#[command(name = "rollbook")]
#[command(author, version, about = "Consolidate class-roster workbooks", long_about = None)]
struct Cli {
    /// Directory holding the roster workbooks
    #[arg(value_name = "DIR", conflicts_with = "input")]
    dir: Option<PathBuf>,

    /// Roster workbooks to consolidate instead of scanning a directory
    #[arg(long = "input", value_name = "FILE", num_args = 1..)]
    input: Vec<PathBuf>,

    /// Class-info workbook joined into every roster. When scanning a
    /// directory this replaces the discovered class-info file, which is
    /// then skipped entirely.
    #[arg(long = "lookup", value_name = "FILE")]
    lookup: Option<PathBuf>,

    /// Output workbook
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// YAML file with merge options
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format (table, json)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for the run report.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable summary (default)
    #[default]
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON reports stay parseable
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = match &cli.config {
        Some(path) => load_options(path)?,
        None => MergeOptions::default(),
    };

    let report = run(&cli, &options)?;
    print_report(&report, cli.format)?;

    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Load merge options from a YAML file.
fn load_options(path: &Path) -> Result<MergeOptions> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_yaml::from_str(&source)
        .with_context(|| format!("Invalid config: {}", path.display()))
}

/// Resolve inputs, lookup and output, then consolidate.
fn run(cli: &Cli, options: &MergeOptions) -> Result<ConsolidationReport> {
    if !cli.input.is_empty() {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&options.output_name));
        return Ok(consolidate(
            &cli.input,
            cli.lookup.as_deref(),
            &output,
            options,
        ));
    }

    let dir = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut found = discover_inputs(&dir, options)
        .with_context(|| format!("Failed to scan directory: {}", dir.display()))?;
    if let Some(lookup) = &cli.lookup {
        found.override_lookup(lookup.clone());
    }
    let output = cli.output.clone().unwrap_or(found.output);

    Ok(consolidate(&found.inputs, found.lookup.as_deref(), &output, options))
}

/// Print the run report in the requested format.
fn print_report(report: &ConsolidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            for line in summary_lines(report) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn summary_lines(report: &ConsolidationReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.success {
        lines.push(format!(
            "{} {} sheets written from {} files",
            "Done:".green().bold(),
            report.sheets_written,
            report.files_processed
        ));
    } else {
        lines.push(format!(
            "{} {}",
            "Error:".red().bold(),
            report.error.as_deref().unwrap_or("consolidation failed")
        ));
    }

    if !report.excluded_versions.is_empty() {
        lines.push(format!(
            "{} {}",
            "Older versions:".yellow(),
            report.excluded_versions.join(", ")
        ));
    }
    if !report.skipped.is_empty() {
        lines.push(format!("{} {}", "Skipped:".yellow(), report.skipped.len()));
        for item in &report.skipped {
            lines.push(format!("  {}: {}", item.name, item.reason));
        }
    }
    lines
}
