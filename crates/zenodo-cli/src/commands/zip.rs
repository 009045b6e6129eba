//! `zenodo zip` command implementation

use crate::archive;
use crate::error::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Zip a folder next to itself
pub async fn run(folder: PathBuf) -> Result<()> {
    let archive_path = tokio::task::spawn_blocking(move || archive::zip_folder(&folder)).await??;

    println!("{} {}", "✓".green(), archive_path.display());
    Ok(())
}
