//! ReportForge CLI — repository-to-report generation tool.
//!
//! Ingests the markdown documents of a remote repository, drives them
//! through a generation service, and writes the result as a bounded
//! sequence of display-ready pages.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
