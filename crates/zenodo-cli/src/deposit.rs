//! Deposition lifecycle: create, upload, describe, publish
//!
//! A deposition starts as a draft with an upload bucket. Files are PUT into
//! the bucket, metadata is attached, and publishing makes it immutable.

use crate::api::client::{ensure_success, is_ok, read_json, status_error};
use crate::api::types::{BucketFile, CreatedDeposition, MetadataRequest};
use crate::api::{endpoints, DepositionMetadata, NewDeposition, ZenodoClient};
use crate::error::{Result, ZenodoError};
use crate::progress;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, StatusCode};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Create an empty draft deposition and return its id and bucket URL
#[instrument(skip(client), fields(base_url = %client.base_url()))]
pub async fn create_deposition(client: &ZenodoClient) -> Result<NewDeposition> {
    let url = client.depositions_url();

    let response = client
        .post(&url)
        .json(&serde_json::json!({}))
        .send()
        .await?;
    let response = ensure_success(response).await?;

    let created: CreatedDeposition = read_json(response, "deposition creation").await?;
    let deposition = NewDeposition::from(created);

    info!(deposition_id = deposition.id, "Deposition created");
    Ok(deposition)
}

/// Stream a local file into a deposition bucket
///
/// The file lands under its own file name.
#[instrument(skip(client, file_path), fields(file = %file_path.as_ref().display()))]
pub async fn add_file(
    client: &ZenodoClient,
    bucket_url: &str,
    file_path: impl AsRef<Path>,
) -> Result<BucketFile> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(ZenodoError::FileNotFound(file_path.display().to_string()));
    }
    if !file_path.is_file() {
        return Err(ZenodoError::NotAFile(file_path.display().to_string()));
    }

    let filename = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ZenodoError::NotAFile(file_path.display().to_string()))?;
    let url = endpoints::bucket_file_url(bucket_url, &filename);

    let file = tokio::fs::File::open(file_path).await?;
    let size = file.metadata().await?.len();

    let pb = progress::spinner(&format!("Uploading {filename} ({})", progress::format_bytes(size)));
    let response = client
        .put(&url)
        .header(CONTENT_LENGTH, size)
        .body(Body::from(file))
        .send()
        .await;
    pb.finish_and_clear();

    let response = ensure_success(response?).await?;
    let uploaded: BucketFile = read_json(response, "bucket upload").await?;

    info!(
        key = %uploaded.key,
        size = %progress::format_bytes(size),
        "File uploaded"
    );
    Ok(uploaded)
}

/// Attach metadata to a deposition and, if accepted, publish it
///
/// Returns the status code of the publish call. Metadata answers other than
/// 200 OK are returned as `UnexpectedStatus` and nothing is published.
#[instrument(skip(client, metadata), fields(title = %metadata.title))]
pub async fn add_metadata_and_publish(
    client: &ZenodoClient,
    deposition_id: u64,
    metadata: &DepositionMetadata,
) -> Result<StatusCode> {
    let url = endpoints::deposition_url(client.base_url(), deposition_id);

    let response = client
        .put(&url)
        .json(&MetadataRequest { metadata })
        .send()
        .await?;

    if !is_ok(response.status()) {
        let err = status_error(response).await;
        warn!(deposition_id, error = %err, "Metadata upload failed");
        return Err(err);
    }
    info!(deposition_id, "Metadata upload successful");

    let publish = client
        .post(&endpoints::publish_url(client.base_url(), deposition_id))
        .send()
        .await?;
    let status = publish.status();

    if status.is_success() {
        info!(deposition_id, status = status.as_u16(), "Deposition published");
    } else {
        warn!(deposition_id, status = status.as_u16(), "Publish request was not accepted");
    }
    Ok(status)
}

/// Create a deposition and upload one archive into it
///
/// Returns the new deposition id. Metadata and publishing are a separate step
/// ([`add_metadata_and_publish`]). `artifact` must be a regular file;
/// directories are rejected rather than guessing which file inside to send.
pub async fn upload_archive(client: &ZenodoClient, artifact: impl AsRef<Path>) -> Result<u64> {
    let artifact = artifact.as_ref();
    if artifact.is_dir() {
        return Err(ZenodoError::NotAFile(artifact.display().to_string()));
    }
    if !artifact.is_file() {
        return Err(ZenodoError::FileNotFound(artifact.display().to_string()));
    }

    let deposition = create_deposition(client).await?;
    add_file(client, &deposition.bucket_url, artifact).await?;

    Ok(deposition.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::creators_from_mapping;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{body_bytes, body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> ZenodoClient {
        ZenodoClient::new(server.uri(), "test-token").unwrap()
    }

    async fn mount_create(server: &MockServer, id: u64) {
        Mock::given(method("POST"))
            .and(path("/api/deposit/depositions"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": id,
                "state": "unsubmitted",
                "links": {"bucket": format!("{}/api/files/bucket-{}", server.uri(), id)}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn sample_metadata() -> DepositionMetadata {
        DepositionMetadata::new(
            "Koster fish detector",
            "YOLOv5 weights trained on Koster footage",
            creators_from_mapping([("Jane Doe", "University of Gothenburg")]),
        )
    }

    #[tokio::test]
    async fn test_create_deposition() {
        let server = MockServer::start().await;
        mount_create(&server, 101).await;

        let deposition = create_deposition(&client_for(&server)).await.unwrap();

        assert_eq!(deposition.id, 101);
        assert_eq!(
            deposition.bucket_url,
            format!("{}/api/files/bucket-101", server.uri())
        );
    }

    #[tokio::test]
    async fn test_create_deposition_missing_bucket_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/deposit/depositions"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5, "links": {}})))
            .mount(&server)
            .await;

        let err = create_deposition(&client_for(&server)).await.unwrap_err();
        assert!(matches!(err, ZenodoError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_create_deposition_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/deposit/depositions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": 401,
                "message": "The server could not verify that you are authorized to access the URL requested."
            })))
            .mount(&server)
            .await;

        let err = create_deposition(&client_for(&server)).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_add_file_puts_bytes_under_filename() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("ref_model.zip");
        std::fs::write(&file, b"zip bytes").unwrap();

        Mock::given(method("PUT"))
            .and(path("/api/files/bucket-9/ref_model.zip"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_bytes(b"zip bytes".to_vec()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "key": "ref_model.zip",
                "size": 9,
                "checksum": "md5:0b1b2c6a3840b1f1fbbbd72f1c1203b3",
                "mimetype": "application/zip"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bucket = format!("{}/api/files/bucket-9", server.uri());
        let uploaded = add_file(&client_for(&server), &bucket, &file).await.unwrap();

        assert_eq!(uploaded.key, "ref_model.zip");
        assert_eq!(uploaded.size, Some(9));
    }

    #[tokio::test]
    async fn test_add_file_missing_source() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();

        let err = add_file(
            &client_for(&server),
            "http://unused/bucket",
            temp.path().join("nope.zip"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ZenodoError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_metadata_then_publish() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/deposit/depositions/77"))
            .and(body_json(json!({
                "metadata": {
                    "title": "Koster fish detector",
                    "upload_type": "software",
                    "description": "YOLOv5 weights trained on Koster footage",
                    "creators": [{"name": "Jane Doe", "affiliation": "University of Gothenburg"}],
                    "communities": [{"identifier": "odf-sweden"}],
                    "notes": crate::api::ATTRIBUTION_NOTE
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 77})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/deposit/depositions/77/actions/publish"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": 77, "submitted": true})))
            .expect(1)
            .mount(&server)
            .await;

        let status = add_metadata_and_publish(&client_for(&server), 77, &sample_metadata())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_metadata_rejected_skips_publish() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/deposit/depositions/78"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": 400,
                "message": "Validation error."
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/deposit/depositions/78/actions/publish"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let err = add_metadata_and_publish(&client_for(&server), 78, &sample_metadata())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Validation error."));
    }

    #[tokio::test]
    async fn test_upload_archive_returns_deposition_id() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.zip");
        std::fs::write(&archive, b"zip bytes").unwrap();

        mount_create(&server, 55).await;
        Mock::given(method("PUT"))
            .and(path("/api/files/bucket-55/ref_model.zip"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"key": "ref_model.zip"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = upload_archive(&client_for(&server), &archive).await.unwrap();
        assert_eq!(id, 55);
    }

    #[tokio::test]
    async fn test_upload_archive_rejects_directory() {
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = upload_archive(&client_for(&server), temp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ZenodoError::NotAFile(_)));
    }
}
