//! cvscreen CLI: screen one resume against its GitHub profile.
//!
//! Reads a PDF resume, verifies the linked GitHub profile, records accepted
//! candidates in a local database and prints a structured summary.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
