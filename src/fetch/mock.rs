//! In-memory fetcher for tests
//!
//! Serves registered resources by exact URL. Unregistered URLs are not
//! found; transport failures can be injected per URL.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::Url;

use super::{FetchError, Fetcher};

#[derive(Debug, Clone)]
enum MockResource {
    Bytes(Vec<u8>),
    Failure(FetchError),
}

/// Fetcher backed by a URL -> bytes map
#[derive(Debug, Default)]
pub struct MockFetcher {
    resources: HashMap<String, MockResource>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Create a fetcher with no resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`
    pub fn with_resource(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.resources
            .insert(url.to_string(), MockResource::Bytes(body.into()));
        self
    }

    /// Fail requests for `url` with a transport error
    pub fn with_transport_error(mut self, url: &str, reason: &str) -> Self {
        self.resources.insert(
            url.to_string(),
            MockResource::Failure(FetchError::Transport(reason.to_string())),
        );
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        match self.resources.get(url.as_str()) {
            Some(MockResource::Bytes(body)) => Ok(body.clone()),
            Some(MockResource::Failure(err)) => Err(err.clone()),
            None => Err(FetchError::NotFound(404)),
        }
    }
}
