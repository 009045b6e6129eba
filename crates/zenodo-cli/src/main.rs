//! Zenodo CLI - Main entry point

use clap::Parser;
use std::process;
use tracing::error;
use zenodo_cli::{Cli, Commands};
use zenodo_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("zenodo")
        .build();

    // Environment variables take precedence over the flag-derived defaults
    let log_config = LogConfig::from_env_with(log_config.clone()).unwrap_or(log_config);

    // The CLI works without logging, so a failed init is not fatal
    let _log_guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> zenodo_cli::Result<()> {
    match &cli.command {
        Commands::Zip { folder } => zenodo_cli::commands::zip::run(folder.clone()).await,

        Commands::Extract { archive, dest } => {
            zenodo_cli::commands::extract::run(archive.clone(), dest.clone()).await
        }

        Commands::Upload { path, metadata } => {
            let config = cli.config()?;
            zenodo_cli::commands::upload::run(&config, path.clone(), metadata).await
        }

        Commands::Publish {
            deposition_id,
            metadata,
        } => {
            let config = cli.config()?;
            zenodo_cli::commands::publish::run(&config, *deposition_id, metadata).await
        }

        Commands::Download { dir } => {
            let config = cli.config()?;
            zenodo_cli::commands::download::run(&config, dir.clone()).await
        }
    }
}
