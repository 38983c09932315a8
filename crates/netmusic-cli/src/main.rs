//! Netmusic CLI
//!
//! Command-line entry point for the Netmusic link-prediction pipeline.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use netmusic_cli::{Cli, run};
use netmusic_core::NetmusicConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose; `log` records from the libraries are
    // forwarded into the subscriber.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = NetmusicConfig::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::debug!(root = %config.data.root.display(), "configuration resolved");

    run(&config, cli.command)?;
    Ok(())
}
