//! Fetch capability for remote rule tables

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Errors from a remote refresh attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Connection failed or timed out
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// Document could not be turned into rules
    #[error("parse error: {0}")]
    ParseError(String),
}

/// Retrieves a document by URL
///
/// Injected into the refresh path so it can run without a network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `url`, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError>;
}

/// HTTP(S) fetcher backed by reqwest
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with its own connection pool
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError> {
        let request = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok::<Bytes, FetchError>(body)
        };

        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| FetchError::Network(format!("timed out after {:?}", timeout)))?
    }
}
