//! Building a snapshot from the remote tables

use std::time::Duration;

use modcheck_config::RefreshConfig;
use modcheck_core::RuleSnapshot;

use crate::fetch::{FetchError, Fetcher};

/// Where and how to fetch the two remote tables
#[derive(Debug, Clone)]
pub struct RemoteSource {
    /// Weight table URL
    pub weights_url: String,

    /// Substitution table URL
    pub substitutions_url: String,

    /// Timeout applied to each document
    pub timeout: Duration,
}

impl RemoteSource {
    /// Build from refresh config; None unless both URLs are set
    pub fn from_config(config: &RefreshConfig) -> Option<Self> {
        Some(Self {
            weights_url: config.weights_url.clone().filter(|u| !u.is_empty())?,
            substitutions_url: config.substitutions_url.clone().filter(|u| !u.is_empty())?,
            timeout: config.timeout(),
        })
    }
}

/// Fetch both tables and parse them into a new snapshot.
///
/// Either both documents arrive and parse, or the call fails; no partial
/// snapshot is produced. Failures are not retried.
pub async fn fetch_remote(
    fetcher: &dyn Fetcher,
    source: &RemoteSource,
) -> Result<RuleSnapshot, FetchError> {
    let (weights, substitutions) = tokio::try_join!(
        fetcher.fetch(&source.weights_url, source.timeout),
        fetcher.fetch(&source.substitutions_url, source.timeout),
    )?;

    let weights = decode(&weights, "weight table")?;
    let substitutions = decode(&substitutions, "substitution table")?;

    let snapshot = RuleSnapshot::from_tables(weights, substitutions);
    if snapshot.is_empty() {
        return Err(FetchError::ParseError(
            "weight table contained no usable rules".to_string(),
        ));
    }

    Ok(snapshot)
}

fn decode<'a>(body: &'a [u8], what: &str) -> Result<&'a str, FetchError> {
    std::str::from_utf8(body)
        .map_err(|e| FetchError::ParseError(format!("{} is not UTF-8: {}", what, e)))
}
