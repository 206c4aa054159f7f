use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::engines::SearchProvider;
use crate::fetch::identity::{FetchIdentity, ProxyPool, UserAgentGenerator};
use crate::fetch::PageFetcher;

/// Terminal failure for one URL after the retry budget is spent. Never fatal
/// to the caller; a failed URL just contributes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("network failure: {0}")]
    Network(String),

    #[error("blocked: {0}")]
    Blocked(String),

    /// A bot challenge was served. There is no automated bypass; a human has
    /// to clear it, so the URL is reported rather than hammered further.
    #[error("bot challenge detected, requires manual intervention")]
    ManualIntervention,
}

pub type FetchResult = std::result::Result<String, FetchFailure>;

/// Wraps a [`PageFetcher`] with a bounded attempt loop. Every attempt gets a
/// fresh identity; a failed proxied request falls back to a direct one before
/// the attempt counts as spent; attempts are separated by a randomized sleep
/// from the provider's backoff range.
pub struct RetryController {
    fetcher: Arc<dyn PageFetcher>,
    user_agents: UserAgentGenerator,
    proxies: ProxyPool,
    max_attempts: u32,
    randomize_user_agents: bool,
}

impl RetryController {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        proxies: Vec<String>,
        max_attempts: u32,
        randomize_user_agents: bool,
    ) -> Self {
        Self {
            fetcher,
            user_agents: UserAgentGenerator::new(),
            proxies: ProxyPool::new(proxies),
            max_attempts,
            randomize_user_agents,
        }
    }

    pub async fn fetch(&self, url: &str, provider: &SearchProvider) -> FetchResult {
        let mut last_failure = FetchFailure::Network("no attempts made".to_string());

        for attempt in 1..=self.max_attempts {
            let proxy = self.proxies.random_proxy().map(str::to_string);
            let proxied = proxy.is_some();

            match self.attempt(url, provider, proxy).await {
                Ok(body) => return Ok(body),
                Err(failure) => {
                    if proxied {
                        // proxy failures get one direct shot before the
                        // attempt is spent
                        debug!(
                            "Proxied request for {} failed ({}), retrying direct",
                            url, failure
                        );
                        match self.attempt(url, provider, None).await {
                            Ok(body) => return Ok(body),
                            Err(direct_failure) => last_failure = direct_failure,
                        }
                    } else {
                        last_failure = failure;
                    }
                }
            }

            if attempt < self.max_attempts {
                let backoff = {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(provider.backoff_ms.0..=provider.backoff_ms.1)
                };
                debug!(
                    "Attempt {}/{} for {} failed ({}), backing off {}ms",
                    attempt, self.max_attempts, url, last_failure, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
        }

        warn!(
            "Giving up on {} after {} attempts: {}",
            url, self.max_attempts, last_failure
        );
        Err(last_failure)
    }

    async fn attempt(
        &self,
        url: &str,
        provider: &SearchProvider,
        proxy: Option<String>,
    ) -> FetchResult {
        let user_agent = if self.randomize_user_agents {
            self.user_agents.random_user_agent()
        } else {
            self.user_agents.static_user_agent()
        };
        let identity = FetchIdentity::for_provider(provider, user_agent.to_string(), proxy);

        let page = self
            .fetcher
            .fetch(url, &identity)
            .await
            .map_err(|e| FetchFailure::Network(e.to_string()))?;

        if page.status == 429 {
            return Err(FetchFailure::Blocked(format!(
                "rate limited (429) fetching {}",
                url
            )));
        }
        if page.body.to_lowercase().contains("captcha") {
            return Err(FetchFailure::ManualIntervention);
        }
        if page.status >= 400 {
            return Err(FetchFailure::Network(format!(
                "HTTP {} fetching {}",
                page.status, url
            )));
        }

        Ok(page.body)
    }
}
