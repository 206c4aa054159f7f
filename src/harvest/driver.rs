use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::engines::SearchProvider;
use crate::error::Result;
use crate::extract::{extract_emails, prioritize, LinkExtractor};
use crate::fetch::RetryController;
use crate::harvest::CancelSignal;

/// Runs one provider's search page end to end: search URL, link extraction,
/// prioritization, capped link fetches, email extraction.
pub struct SourceDriver {
    provider: &'static SearchProvider,
    controller: Arc<RetryController>,
    extractor: LinkExtractor,
    links_per_page: usize,
    link_delay_ms: (u64, u64),
}

impl SourceDriver {
    pub fn new(
        provider: &'static SearchProvider,
        controller: Arc<RetryController>,
        links_per_page: usize,
        link_delay_ms: (u64, u64),
    ) -> Result<Self> {
        Ok(Self {
            provider,
            controller,
            extractor: LinkExtractor::new()?,
            links_per_page,
            link_delay_ms,
        })
    }

    /// Harvest one result page of one query variant. Failures at any depth
    /// degrade to an empty contribution; this never errors.
    pub async fn run(
        &self,
        query_variant: &str,
        page_index: u32,
        cancel: &CancelSignal,
    ) -> HashSet<String> {
        let search_url = self.provider.search_url(query_variant, page_index);
        info!(
            "Searching on {} - page {}",
            self.provider.name,
            page_index + 1
        );

        let body = match self.controller.fetch(&search_url, self.provider).await {
            Ok(body) => body,
            Err(failure) => {
                warn!(
                    "Skipping {} page {}: {}",
                    self.provider.name,
                    page_index + 1,
                    failure
                );
                return HashSet::new();
            }
        };

        let links = self.extractor.extract_links(&body, self.provider.domain);
        if links.is_empty() {
            debug!(
                "No candidate links on {} page {}",
                self.provider.name,
                page_index + 1
            );
            return HashSet::new();
        }

        let ordered = prioritize(links);
        debug!(
            "Found {} links on {} page {}, following up to {}",
            ordered.len(),
            self.provider.name,
            page_index + 1,
            self.links_per_page
        );

        // staggered concurrent batch: each link task starts after its own
        // cumulative jitter, all are joined before the page is done
        let mut tasks = Vec::new();
        let mut start_offset_ms = 0u64;

        for candidate in ordered.into_iter().take(self.links_per_page) {
            if cancel.is_cancelled() {
                debug!("Cancelled while scheduling links, stopping page early");
                break;
            }

            start_offset_ms += {
                let mut rng = rand::thread_rng();
                rng.gen_range(self.link_delay_ms.0..=self.link_delay_ms.1)
            };

            let controller = self.controller.clone();
            let provider = self.provider;
            let cancel = cancel.clone();
            let url = candidate.url.clone();
            let delay = Duration::from_millis(start_offset_ms);

            tasks.push(tokio::spawn(async move {
                sleep(delay).await;
                if cancel.is_cancelled() {
                    return HashSet::new();
                }
                match controller.fetch(url.as_str(), provider).await {
                    Ok(body) => {
                        let emails = extract_emails(&body);
                        if !emails.is_empty() {
                            for email in &emails {
                                info!("Found email: {} (source: {})", email, url);
                            }
                        }
                        emails
                    }
                    Err(failure) => {
                        debug!("No content for {}: {}", url, failure);
                        HashSet::new()
                    }
                }
            }));
        }

        let mut page_emails = HashSet::new();
        for task in tasks {
            match task.await {
                Ok(link_emails) => page_emails.extend(link_emails),
                Err(e) => warn!("Link task panicked: {}", e),
            }
        }

        page_emails
    }
}
