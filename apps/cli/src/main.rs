//! Chunkweave CLI — in-place markdown chunking for retrieval pipelines.
//!
//! Rewrites markdown documents into boundary-tagged, context-enriched
//! chunks ready for downstream indexing.

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
