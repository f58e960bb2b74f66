//! deskext - Developer CLI for the extension boundary
//!
//! Inspects extension manifests, prints the facade mapping tables and runs a
//! simulated load/interact/unload cycle against an in-process host.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("deskext=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;

    match cli.command {
        Commands::Inspect { dir, json } => commands::inspect::execute(&dir, json, &config).await,
        Commands::Mappings { json } => commands::mappings::execute(json),
        Commands::Simulate { dir } => commands::simulate::execute(&dir, &config).await,
        Commands::Version => {
            println!(
                "deskext {} (error codes v{})",
                env!("CARGO_PKG_VERSION"),
                deskext_sdk::ERROR_CODE_CONTRACT_VERSION
            );
            Ok(())
        }
    }
}
