#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use rewind_config::RewindConfig;

mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("rwd error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = load_config(flags.config.as_deref())?;

    commands::dispatch::dispatch(cli.command, &config, &flags).await
}

fn load_config(path: Option<&str>) -> anyhow::Result<RewindConfig> {
    match path {
        Some(path) => RewindConfig::load_from(Path::new(path))
            .with_context(|| format!("failed to load config from {path}")),
        None => RewindConfig::load_with_dotenv().context("failed to load rewind config"),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("REWIND_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
