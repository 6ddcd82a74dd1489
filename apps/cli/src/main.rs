//! Handbook CLI: builds a LaTeX handbook from a website's pages.
//!
//! Fetches each configured section, converts its content to LaTeX and
//! writes a single compilable `.tex` document.

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
