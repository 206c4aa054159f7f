pub mod identity;
pub mod retry;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::debug;

use crate::error::{HarvestError, Result};

pub use identity::{FetchIdentity, ProxyPool, UserAgentGenerator};
pub use retry::{FetchFailure, FetchResult, RetryController};

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// One retrieval attempt for a URL under one identity. Implementations carry
/// no state across calls; a rendering-based fetcher can be slotted in behind
/// this same contract.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, identity: &FetchIdentity) -> Result<FetchedPage>;
}

/// Stateless HTTP fetcher. A fresh client is built per attempt from the
/// identity, so proxy and headers never leak between requests.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_client(&self, identity: &FetchIdentity) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        for (name, value) in &identity.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => debug!("Skipping malformed header {}: {}", name, value),
            }
        }
        if let Ok(value) = HeaderValue::from_str(&identity.user_agent) {
            headers.insert(USER_AGENT, value);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers);

        if let Some(ref proxy) = identity.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| HarvestError::NetworkError(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| HarvestError::FetchUnavailable(format!("Failed to build HTTP client: {}", e)).into())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, identity: &FetchIdentity) -> Result<FetchedPage> {
        let client = self.build_client(identity)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::NetworkError(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::NetworkError(format!("Failed to read body from {}: {}", url, e)))?;

        Ok(FetchedPage { status, body })
    }
}
