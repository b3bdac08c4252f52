//! Error types for the Teraslice stats collector.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for collector operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors that abort a collection cycle.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme: {0} (expected http or https)")]
    UnsupportedScheme(String),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),

    #[error("error getting {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

impl StatsError {
    /// The resource URL this error refers to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            StatsError::InvalidUrl { url, .. } | StatsError::Fetch { url, .. } => Some(url),
            StatsError::UnsupportedScheme(_) | StatsError::Tls(_) => None,
        }
    }
}

/// Failure of a single resource fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request URI: {0}")]
    Uri(#[from] http::uri::InvalidUri),

    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed reading response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("unexpected status {0}")]
    Status(http::StatusCode),

    #[error("empty response body")]
    EmptyBody,

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
