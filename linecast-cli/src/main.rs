//! linecast CLI entry point.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use output::OutputWriter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(cli.log_level.as_deref(), cli.log_format)?;

    let writer = OutputWriter::new(cli.output);

    if let Err(e) = commands::run(cli.command, &cli.config, &writer).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}
