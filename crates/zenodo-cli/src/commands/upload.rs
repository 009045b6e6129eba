//! `zenodo upload` command implementation
//!
//! Folders are zipped first; the archive is uploaded into a new deposition,
//! which is published when a title is given.

use crate::api::ZenodoClient;
use crate::archive;
use crate::config::Config;
use crate::deposit;
use crate::error::Result;
use crate::MetadataArgs;
use colored::Colorize;
use std::path::PathBuf;

/// Upload a file or folder as a new deposition
pub async fn run(config: &Config, path: PathBuf, metadata: &MetadataArgs) -> Result<()> {
    let client = ZenodoClient::from_config(config)?;

    let artifact = if path.is_dir() {
        println!("{} Zipping {}...", "→".cyan(), path.display());
        tokio::task::spawn_blocking(move || archive::zip_folder(&path)).await??
    } else {
        path
    };

    println!("{} Uploading {}...", "↑".cyan(), artifact.display());
    let deposition_id = deposit::upload_archive(&client, &artifact).await?;
    println!("{} Deposition {} created", "✓".green(), deposition_id);

    let Some(metadata) = metadata.to_metadata() else {
        println!(
            "Draft left unpublished. Run 'zenodo publish {} --title ...' to publish it.",
            deposition_id
        );
        return Ok(());
    };

    let status = deposit::add_metadata_and_publish(&client, deposition_id, &metadata).await?;
    if status.is_success() {
        println!("{} Deposition {} published", "✓".green(), deposition_id);
    } else {
        println!(
            "{} Publishing deposition {} returned HTTP {}",
            "!".yellow(),
            deposition_id,
            status.as_u16()
        );
    }
    Ok(())
}
