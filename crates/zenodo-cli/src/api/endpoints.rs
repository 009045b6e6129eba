//! API endpoint URL builders
//!
//! Helper functions to construct Zenodo REST endpoint URLs.

/// Build the account depositions endpoint (create / list)
pub fn depositions_url(base_url: &str) -> String {
    format!("{}/api/deposit/depositions", base_url)
}

/// Build a single deposition endpoint (metadata update)
pub fn deposition_url(base_url: &str, deposition_id: u64) -> String {
    format!("{}/api/deposit/depositions/{}", base_url, deposition_id)
}

/// Build the publish action endpoint for a deposition
pub fn publish_url(base_url: &str, deposition_id: u64) -> String {
    format!(
        "{}/api/deposit/depositions/{}/actions/publish",
        base_url, deposition_id
    )
}

/// Build the public record endpoint
pub fn record_url(base_url: &str, record_id: u64) -> String {
    format!("{}/api/records/{}", base_url, record_id)
}

/// Build the upload target for a file inside a deposition bucket
pub fn bucket_file_url(bucket_url: &str, filename: &str) -> String {
    format!(
        "{}/{}",
        bucket_url.trim_end_matches('/'),
        urlencoding::encode(filename)
    )
}

/// Turn a file `self` link into a downloadable URL
///
/// Links minted while a deposition was a draft point at `/draft` paths that
/// stop resolving once the record is published.
pub fn download_url(self_link: &str) -> String {
    self_link.replace("/draft", "")
}
