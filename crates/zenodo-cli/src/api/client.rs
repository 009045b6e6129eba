//! Authenticated HTTP client for the Zenodo REST API
//!
//! Every request the crate sends is built here, so the access token is
//! attached in exactly one place.

use crate::api::endpoints;
use crate::api::types::ErrorBody;
use crate::config::Config;
use crate::error::{Result, ZenodoError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// How the access token travels with each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `?access_token=<token>`
    QueryParam,
}

impl std::str::FromStr for AuthScheme {
    type Err = ZenodoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bearer" | "header" => Ok(AuthScheme::Bearer),
            "query" | "query-param" | "access_token" => Ok(AuthScheme::QueryParam),
            _ => Err(ZenodoError::config(format!(
                "Unknown auth scheme '{}', expected 'bearer' or 'query'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthScheme::Bearer => f.write_str("bearer"),
            AuthScheme::QueryParam => f.write_str("query"),
        }
    }
}

/// API client bound to one Zenodo instance and one access token
#[derive(Clone)]
pub struct ZenodoClient {
    client: Client,
    base_url: String,
    token: String,
    auth: AuthScheme,
}

impl std::fmt::Debug for ZenodoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenodoClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("auth", &self.auth)
            .finish()
    }
}

impl ZenodoClient {
    /// Create a client with the default timeout and bearer authentication
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::build(
            base_url.into(),
            token.into(),
            AuthScheme::default(),
            Duration::from_secs(crate::config::DEFAULT_API_TIMEOUT_SECS),
        )
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.require_token()?;
        Self::build(
            config.base_url.clone(),
            token.to_string(),
            config.auth_scheme,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build(
        base_url: String,
        token: String,
        auth: AuthScheme,
        read_timeout: Duration,
    ) -> Result<Self> {
        // Only connecting and stalled reads time out; streamed archives
        // have no overall deadline
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(
                crate::config::DEFAULT_CONNECT_TIMEOUT_SECS,
            ))
            .read_timeout(read_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            auth,
        })
    }

    /// Switch how the token is attached
    pub fn with_auth_scheme(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth
    }

    pub fn depositions_url(&self) -> String {
        endpoints::depositions_url(&self.base_url)
    }

    /// Authenticated GET
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Authenticated POST
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.post(url))
    }

    /// Authenticated PUT
    pub fn put(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.put(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth {
            AuthScheme::Bearer => request.bearer_auth(&self.token),
            AuthScheme::QueryParam => request.query(&[("access_token", self.token.as_str())]),
        }
    }
}

/// Pass 2xx responses through, turn anything else into `UnexpectedStatus`
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

/// Build an `UnexpectedStatus` error, using Zenodo's `message` when present
pub(crate) async fn status_error(response: Response) -> ZenodoError {
    let status = response.status();
    // The query may carry the access token
    let mut url = response.url().clone();
    url.set_query(None);
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    ZenodoError::unexpected_status(status, url.to_string(), message)
}

/// Deserialize a body, reporting shape mismatches as `MalformedResponse`
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ZenodoError::malformed(context, err))
}

/// Whether the status is exactly 200 OK
pub(crate) fn is_ok(status: StatusCode) -> bool {
    status == StatusCode::OK
}
