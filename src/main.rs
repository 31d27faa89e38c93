//! sqlplay - SQL code generation playground
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use sqlplay::cli::{Cli, Commands};
use sqlplay::config::{Config, ConfigManager};
use sqlplay::error::PlayResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PlayResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::default(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Serve(args) => sqlplay::cli::commands::serve(args, &config).await,
        Commands::Build(args) => sqlplay::cli::commands::build(args, &config).await,
        Commands::Fingerprint(args) => sqlplay::cli::commands::fingerprint(args, &config).await,
        Commands::Cache(args) => sqlplay::cli::commands::cache(args, &config).await,
        Commands::Config(args) => sqlplay::cli::commands::config(args, &config, cli.config).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG takes precedence
fn init_logging(verbose: u8, config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("sqlplay=warn"),
        1 => EnvFilter::new("sqlplay=info,tower_http=info"),
        _ => EnvFilter::new("sqlplay=debug,tower_http=debug"),
    });

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
