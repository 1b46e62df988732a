//! Remote document retrieval
//!
//! [`HttpFetcher`] performs exactly one GET per call. There is no retry: a
//! non-200 status or a transport failure is returned to the caller as is.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("entsoe-extract/", env!("CARGO_PKG_VERSION"));

/// Source of raw XML documents
///
/// The pipeline only needs "bytes for a URL"; the trait keeps the transport
/// swappable in tests and embedders.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document at `url` and return its body
    ///
    /// # Errors
    /// - [`Error::Transport`] when the request cannot be completed
    /// - [`Error::RemoteRequest`] when the server answers anything but 200
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Single-attempt HTTP GET client
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher
    ///
    /// `timeout` of `None` keeps the client's default behaviour.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be built (e.g. the
    /// TLS backend fails to initialise).
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {e}"),
            key: None,
        })?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url = %redact_token(url), "sending GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: redact_token(url),
                source,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::RemoteRequest {
                status: status.as_u16(),
                url: redact_token(url),
            });
        }

        let body = response.bytes().await.map_err(|source| Error::Transport {
            url: redact_token(url),
            source,
        })?;

        info!(bytes = body.len(), "fetched document");
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Mask the `securityToken` query value so URLs can be logged
pub fn redact_token(url: &str) -> String {
    const PARAM: &str = "securityToken=";

    let Some(start) = url.find(PARAM).map(|i| i + PARAM.len()) else {
        return url.to_string();
    };
    let end = url[start..]
        .find('&')
        .map_or(url.len(), |offset| start + offset);

    format!("{}***{}", &url[..start], &url[end..])
}
