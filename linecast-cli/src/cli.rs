//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// linecast -- turn raw log lines into schema-shaped records.
///
/// Use `linecast <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "linecast", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (`.ini`, or `.yml`/`.yaml` for YAML).
    #[arg(short, long, default_value = "linecast.ini", global = true)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log line format written to stderr.
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Supported log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON lines.
    Json,
    /// Human-readable.
    Pretty,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration.
    Config(ConfigArgs),

    /// Parse lines of a configured logfile into records.
    Parse(ParseArgs),
}

// ---- config ----

/// Manage linecast configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides), credentials redacted.
    Show {
        /// Show only a specific section (general, streams, files).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- parse ----

/// Run a configured logfile's parser over input lines.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Logfile section name from the configuration.
    #[arg(short, long)]
    pub logfile: String,

    /// Input file (default: stdin).
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}
