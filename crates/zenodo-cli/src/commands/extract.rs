//! `zenodo extract` command implementation

use crate::archive;
use crate::error::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Extract an archive and list its members
pub async fn run(archive_path: PathBuf, dest: Option<PathBuf>) -> Result<()> {
    let dest = dest.unwrap_or_else(|| {
        archive_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let (members, dest) = tokio::task::spawn_blocking(move || {
        archive::extract_archive(&archive_path, &dest).map(|members| (members, dest))
    })
    .await??;

    if members.is_empty() {
        println!("Nothing extracted. Supported formats: .zip, .tar.gz, .tgz, .tar");
        return Ok(());
    }

    println!(
        "{} Extracted {} member(s) into {}",
        "✓".green(),
        members.len(),
        dest.display()
    );
    for member in &members {
        println!("  {}", member);
    }
    Ok(())
}
