//! `zenodo download` command implementation

use crate::api::ZenodoClient;
use crate::config::Config;
use crate::error::Result;
use crate::fetch;
use colored::Colorize;
use std::path::PathBuf;

/// Download and extract every model archive in the account
pub async fn run(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let client = ZenodoClient::from_config(config)?;
    let dir = dir.unwrap_or_else(|| config.download_dir.clone());

    println!("{} Fetching models into {}...", "↓".cyan(), dir.display());
    let models = fetch::download_and_extract_models(&client, &dir).await?;

    if models.is_empty() {
        println!("No model archives found.");
        return Ok(());
    }

    println!("{} {} model(s) ready", "✓".green(), models.len());
    for (name, path) in &models {
        println!("  {} → {}", name.green(), path.display());
    }
    Ok(())
}
