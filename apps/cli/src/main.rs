//! eo-tracker CLI: incremental executive order fetcher.
//!
//! Queries the Federal Register for orders published since the stored
//! watermark, appends their metadata to a CSV log, and writes a plain-text
//! rendition of each order's full text.

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
