//! Byte retrieval
//!
//! Abstracts the network for testability. Provides:
//! - Fetcher trait: "fetch bytes, report errors"
//! - HttpFetcher: blocking HTTP(S) client for production
//! - MockFetcher: in-memory resources with failure injection for tests

mod mock;

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::debug;

pub use mock::MockFetcher;

/// Fetch errors. Callers rely on `NotFound` being distinct from everything else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("not found (HTTP {0})")]
    NotFound(u16),

    #[error("{0}")]
    Transport(String),
}

/// Retrieve the bytes behind a URL
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("gpget/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking HTTP(S) fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound(status.as_u16()));
        }
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        debug!(%url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}
