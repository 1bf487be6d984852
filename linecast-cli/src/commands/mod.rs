//! Command handlers -- one module per subcommand

pub mod config;
pub mod parse;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Dispatch a parsed subcommand to its handler.
pub async fn run(
    command: Commands,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Config(args) => config::execute(args, config_path, writer).await,
        Commands::Parse(args) => parse::execute(args, config_path, writer).await,
    }
}
