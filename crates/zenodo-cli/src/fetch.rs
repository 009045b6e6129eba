//! Model download from the account's depositions
//!
//! Walks the deposition listing page by page, reads each record's files,
//! downloads the model archives (keys containing `ref`), extracts them and
//! keeps the path of the `.pt` weights found inside.

use crate::api::client::{ensure_success, read_json};
use crate::api::{endpoints, Deposition, Record, RecordFile, ZenodoClient};
use crate::archive;
use crate::error::Result;
use crate::progress;
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Substring that marks a file as a model archive
pub const MODEL_KEY_MARKER: &str = "ref";

/// Suffix of the weights file looked up inside an archive
pub const MODEL_FILE_SUFFIX: &str = ".pt";

/// Model name -> extracted weights path
pub type ModelPaths = BTreeMap<String, PathBuf>;

/// A model archive that was downloaded and unpacked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Fetch one page (1-based) of the account's depositions
///
/// An empty list means the listing is exhausted.
#[instrument(skip(client))]
pub async fn fetch_records(client: &ZenodoClient, page: u32) -> Result<Vec<Deposition>> {
    let url = client.depositions_url();
    let response = client
        .get(&url)
        .query(&[("page", page)])
        .send()
        .await?;
    let response = ensure_success(response).await?;

    let records: Vec<Deposition> = read_json(response, "deposition listing").await?;
    debug!(count = records.len(), "Fetched deposition page");
    Ok(records)
}

/// List the files attached to a record
///
/// Records without files yield an empty list.
#[instrument(skip(client))]
pub async fn get_files_from_record(client: &ZenodoClient, record_id: u64) -> Result<Vec<RecordFile>> {
    let url = endpoints::record_url(client.base_url(), record_id);
    let response = ensure_success(client.get(&url).send().await?).await?;

    let record: Record = read_json(response, "record").await?;
    match record.files {
        Some(files) if !files.is_empty() => Ok(files),
        _ => {
            warn!(record_id, "No files found in the published record");
            Ok(Vec::new())
        }
    }
}

/// Download, extract and clean up one record file
///
/// Files whose key lacks [`MODEL_KEY_MARKER`] are skipped without touching
/// the network. Returns `None` when the archive holds no `.pt` file.
#[instrument(skip(client, file, download_dir), fields(key = %file.key))]
pub async fn download_and_process_file(
    client: &ZenodoClient,
    file: &RecordFile,
    download_dir: &Path,
) -> Result<Option<ModelEntry>> {
    if !file.key.contains(MODEL_KEY_MARKER) {
        debug!("Not a model archive, skipping");
        return Ok(None);
    }

    // Keys are flat names; never let one point outside `download_dir`
    let Some(local_name) = Path::new(&file.key).file_name() else {
        warn!("Record file key has no file name, skipping");
        return Ok(None);
    };
    let url = endpoints::download_url(&file.links.self_link);
    let local = download_dir.join(local_name);

    info!(url = %url, "Downloading");
    download_to(client, &url, &local, file.size, &file.key).await?;

    let members = {
        let archive_path = local.clone();
        let dest = download_dir.to_path_buf();
        let extracted =
            tokio::task::spawn_blocking(move || archive::extract_archive(&archive_path, &dest))
                .await;
        // The archive goes away whatever extraction made of it
        tokio::fs::remove_file(&local).await?;
        extracted??
    };

    let Some(member) = archive::find_model_file(&members, MODEL_FILE_SUFFIX) else {
        warn!(members = members.len(), "No model weights found in archive");
        return Ok(None);
    };

    let entry = ModelEntry {
        name: local_name.to_string_lossy().replace(".zip", ""),
        path: download_dir.join(member),
    };
    info!(model = %entry.name, path = %entry.path.display(), "Model extracted");
    Ok(Some(entry))
}

async fn download_to(
    client: &ZenodoClient,
    url: &str,
    local: &Path,
    size_hint: Option<u64>,
    label: &str,
) -> Result<()> {
    let mut response = ensure_success(client.get(url).send().await?).await?;

    let total = response.content_length().or(size_hint);
    let pb = progress::transfer_progress(total, &format!("Downloading {label}"));

    let mut out = tokio::fs::File::create(local).await?;
    let streamed = stream_body(&mut response, &mut out, &pb).await;
    pb.finish_and_clear();
    drop(out);

    match streamed {
        Ok(written) => {
            info!(bytes = %progress::format_bytes(written), "Downloaded successfully");
            Ok(())
        }
        Err(err) => {
            // No partial archives left behind
            if let Err(remove_err) = tokio::fs::remove_file(local).await {
                warn!(error = %remove_err, "Failed to remove partial download");
            }
            Err(err)
        }
    }
}

async fn stream_body(
    response: &mut reqwest::Response,
    out: &mut tokio::fs::File,
    pb: &ProgressBar,
) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }
    out.flush().await?;
    Ok(written)
}

/// Download every model archive in the account and extract it into `download_dir`
///
/// Records or files the server refuses (drafts without a public record,
/// expired links) are logged and skipped. Transport and local I/O failures
/// abort the run.
#[instrument(skip(client, download_dir), fields(dir = %download_dir.as_ref().display()))]
pub async fn download_and_extract_models(
    client: &ZenodoClient,
    download_dir: impl AsRef<Path>,
) -> Result<ModelPaths> {
    let download_dir = download_dir.as_ref();
    tokio::fs::create_dir_all(download_dir).await?;

    let mut models = ModelPaths::new();
    let mut page = 1u32;

    loop {
        let records = match fetch_records(client, page).await {
            Ok(records) => records,
            // Earlier pages are already extracted; keep what they produced
            Err(err) if page > 1 && err.is_unexpected_status() => {
                warn!(page, error = %err, "Deposition listing failed, stopping pagination");
                break;
            }
            Err(err) => return Err(err),
        };
        if records.is_empty() {
            break;
        }

        for record in &records {
            let files = match get_files_from_record(client, record.id).await {
                Ok(files) => files,
                Err(err) if err.is_unexpected_status() => {
                    warn!(record_id = record.id, error = %err, "Skipping record");
                    continue;
                }
                Err(err) => return Err(err),
            };

            for file in &files {
                match download_and_process_file(client, file, download_dir).await {
                    Ok(Some(entry)) => {
                        models.insert(entry.name, entry.path);
                    }
                    Ok(None) => {}
                    Err(err) if err.is_unexpected_status() => {
                        warn!(key = %file.key, error = %err, "Failed to download file");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        page += 1;
    }

    info!(models = models.len(), pages = page - 1, "Model download finished");
    Ok(models)
}
