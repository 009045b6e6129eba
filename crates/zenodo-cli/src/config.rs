//! Configuration management for the Zenodo client
//!
//! Settings come from environment variables and are overridden by
//! command-line flags. Nothing is written back to disk.

use crate::api::AuthScheme;
use crate::error::{Result, ZenodoError};
use std::path::PathBuf;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Production Zenodo instance
pub const DEFAULT_BASE_URL: &str = "https://zenodo.org";

/// Zenodo sandbox instance for trial uploads
pub const SANDBOX_BASE_URL: &str = "https://sandbox.zenodo.org";

/// Default idle timeout in seconds: the longest a request may wait for the
/// next bytes. Whole transfers are not capped, so large archives can take
/// as long as they need.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Timeout for establishing a connection in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Directory that downloaded models are extracted into.
pub const DEFAULT_DOWNLOAD_DIR: &str = "models";

#[derive(Debug, Clone)]
pub struct Config {
    /// Zenodo instance, without trailing slash
    pub base_url: String,

    /// Personal access token
    pub token: Option<String>,

    /// How the token is attached to requests
    pub auth_scheme: AuthScheme,

    /// Idle read timeout per request
    pub timeout_secs: u64,

    /// Where `download` extracts model archives
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            auth_scheme: AuthScheme::default(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from environment variables
    ///
    /// - `ZENODO_BASE_URL`
    /// - `ZENODO_TOKEN`
    /// - `ZENODO_AUTH` (`bearer` or `query`)
    /// - `ZENODO_API_TIMEOUT_SECS`
    /// - `ZENODO_DOWNLOAD_DIR`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var("ZENODO_BASE_URL") {
            config.set_base_url(url);
        }

        if let Ok(token) = std::env::var("ZENODO_TOKEN") {
            config.set_token(token);
        }

        if let Ok(scheme) = std::env::var("ZENODO_AUTH") {
            config.auth_scheme = scheme.parse()?;
        }

        if let Ok(timeout) = std::env::var("ZENODO_API_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|_| {
                ZenodoError::config(format!(
                    "ZENODO_API_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }

        if let Ok(dir) = std::env::var("ZENODO_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Set the base URL, dropping any trailing slash
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
    }

    /// Set the access token; blank tokens count as absent
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    /// Token for calls that talk to the account API
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            ZenodoError::config("No Zenodo access token. Pass --token or set ZENODO_TOKEN")
        })
    }
}
