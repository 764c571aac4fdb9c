//! # repo-pretrain CLI
//!
//! Command parsing and the programmatic [`run`] entrypoint. All reading logic lives in
//! [`crate::reader`]; this module only turns flags (and an optional YAML file) into a
//! [`crate::config::ReadConfig`], drives the reader and writes JSON Lines.
//!
//! Option names follow the underscore spelling (`--input_list`); the dashed spelling is
//! accepted as an alias.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ReadConfig;
use crate::load_config::{load_config, merge_overrides, CliOverrides};
use crate::output::{write_all_records, JsonlWriter, ReadReport};
use crate::reader::RepositoryPretrainAdapter;

/// Accepted `--logging_level` values, matched case-insensitively.
pub const LEVEL_NAMES: [&str; 8] = [
    "TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "CRITICAL", "FATAL",
];

/// CLI for repo-pretrain: turn git repositories into pretraining text.
#[derive(Parser)]
#[clap(
    name = "repo-pretrain",
    version,
    about = "Turns git repositories (local dirs or remote URLs) into text for LLM pretraining"
)]
pub struct Cli {
    /// Log level (DEBUG, INFO, WARNING, ERROR, CRITICAL); defaults to RUST_LOG, then WARNING
    #[clap(
        short = 'l',
        long = "logging_level",
        alias = "logging-level",
        global = true,
        ignore_case = true,
        value_parser = PossibleValuesParser::new(LEVEL_NAMES)
    )]
    pub logging_level: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Turns git repositories into pretraining records. Summary and directory tree are stored in the meta-data.
    FromGitingest(ReadArgs),
}

#[derive(Args, Debug, Default)]
pub struct ReadArgs {
    /// Path or URL of the git repository to read
    #[clap(short = 'i', long = "input", num_args = 1.., value_name = "DIR_OR_URL")]
    pub input: Vec<String>,

    /// Text file(s) listing git repository dirs and/or remote URLs, one per line
    #[clap(
        short = 'I',
        long = "input_list",
        alias = "input-list",
        num_args = 1..,
        value_name = "FILE"
    )]
    pub input_list: Vec<PathBuf>,

    /// Glob pattern(s) for including files (default: all included)
    #[clap(
        short = 'p',
        long = "include_pattern",
        alias = "include-pattern",
        num_args = 1..,
        value_name = "GLOB"
    )]
    pub include_pattern: Vec<String>,

    /// Glob pattern(s) for excluding files (default: none excluded)
    #[clap(
        short = 'e',
        long = "exclude_pattern",
        alias = "exclude-pattern",
        num_args = 1..,
        value_name = "GLOB"
    )]
    pub exclude_pattern: Vec<String>,

    /// JSON Lines file to write records to (default: stdout)
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// YAML config file; command line values replace the file's values
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
}

impl ReadArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            inputs: self.input.clone(),
            input_lists: self.input_list.clone(),
            include_patterns: self.include_pattern.clone(),
            exclude_patterns: self.exclude_pattern.clone(),
        }
    }
}

/// Maps the familiar Python-style level names onto tracing filter directives.
pub fn level_directive(level: &str) -> String {
    match level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

/// Installs the stderr fmt subscriber. Stdout is reserved for records.
pub fn init_tracing(logging_level: Option<&str>) {
    let filter = match logging_level {
        Some(level) => EnvFilter::new(level_directive(level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Extracted CLI logic entrypoint for integration tests and main()
pub fn run(cli: Cli) -> Result<ReadReport> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::FromGitingest(args) => {
            let base = match &args.config {
                Some(path) => load_config(path)?,
                None => ReadConfig::default(),
            };
            let config = merge_overrides(base, args.overrides());
            config.trace_loaded();

            let mut adapter = RepositoryPretrainAdapter::new(config);
            adapter.initialize();

            let report = match &args.output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create output file {}", path.display()))?;
                    let mut writer = JsonlWriter::new(BufWriter::new(file));
                    let report = write_all_records(&mut adapter, &mut writer)
                        .with_context(|| format!("Failed to write records to {}", path.display()))?;
                    writer.finish().context("Failed to flush output file")?;
                    report
                }
                None => {
                    let mut writer = JsonlWriter::new(io::stdout().lock());
                    let report = write_all_records(&mut adapter, &mut writer)
                        .context("Failed to write records to stdout")?;
                    writer.finish().context("Failed to flush stdout")?;
                    report
                }
            };

            tracing::info!(command = "from-gitingest", ?report, "Reading complete");
            eprintln!(
                "Read {} repositories, {} failed.",
                report.produced,
                report.failed.len()
            );
            for failed in &report.failed {
                eprintln!("  failed: {failed}");
            }
            Ok(report)
        }
    }
}
