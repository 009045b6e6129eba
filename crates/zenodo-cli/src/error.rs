//! Error types for the Zenodo client
//!
//! Every remote or local failure surfaces as a [`ZenodoError`] so callers can
//! tell "no data" (an empty `Ok`) apart from "request failed" and
//! "malformed response".

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ZenodoError>;

#[derive(Error, Debug)]
pub enum ZenodoError {
    /// The server answered with a status the call does not accept
    #[error("Zenodo returned HTTP {status} for {url}: {message}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        message: String,
    },

    /// The response body is missing fields or is not the expected JSON
    #[error("Malformed response from {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    /// A single-file operation was given something that is not a regular file
    #[error("Not a file: '{0}'. Zip the directory first (see 'zenodo zip') or pass the archive path.")]
    NotAFile(String),

    /// A folder operation was given something that is not a directory
    #[error("Not a directory: '{0}'")]
    NotADirectory(String),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or command-line flags.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP transport failed
    #[error("Network request failed: {0}. Check your internet connection and the Zenodo URL.")]
    Http(reqwest::Error),

    /// Zip archive could not be read or written
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal failed while collecting files
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A blocking archive task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ZenodoError {
    fn from(mut err: reqwest::Error) -> Self {
        // The query may carry the access token
        if let Some(url) = err.url_mut() {
            url.set_query(None);
        }
        Self::Http(err)
    }
}

impl ZenodoError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(context: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unexpected status error
    pub fn unexpected_status(
        status: reqwest::StatusCode,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnexpectedStatus {
            status: status.as_u16(),
            url: url.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server answered with a non-accepted status
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }
}
