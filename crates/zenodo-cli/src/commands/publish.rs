//! `zenodo publish` command implementation

use crate::api::ZenodoClient;
use crate::config::Config;
use crate::deposit;
use crate::error::{Result, ZenodoError};
use crate::MetadataArgs;
use colored::Colorize;

/// Describe and publish an existing deposition
pub async fn run(config: &Config, deposition_id: u64, metadata: &MetadataArgs) -> Result<()> {
    let metadata = metadata
        .to_metadata()
        .ok_or_else(|| ZenodoError::config("Publishing needs --title"))?;
    let client = ZenodoClient::from_config(config)?;

    let status = deposit::add_metadata_and_publish(&client, deposition_id, &metadata).await?;

    if status.is_success() {
        println!(
            "{} Deposition {} published (HTTP {})",
            "✓".green(),
            deposition_id,
            status.as_u16()
        );
    } else {
        println!(
            "{} Metadata saved, but publishing deposition {} returned HTTP {}",
            "!".yellow(),
            deposition_id,
            status.as_u16()
        );
    }
    Ok(())
}
