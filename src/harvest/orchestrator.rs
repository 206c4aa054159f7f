use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::engines::{provider_by_name, SearchProvider};
use crate::error::{HarvestError, Result};
use crate::fetch::{PageFetcher, RetryController};
use crate::harvest::driver::SourceDriver;
use crate::harvest::{expand_query, CancelHandle, CancelSignal, ResultSet};
use crate::report::RunReport;

/// Owns a whole harvest run: query expansion, the variant × provider × page
/// loop, pacing, the single merge point, and the final report.
pub struct HarvestOrchestrator {
    providers: Vec<&'static SearchProvider>,
    drivers: Vec<SourceDriver>,
    max_pages: u32,
    engine_switch_delay_ms: (u64, u64),
    expand: bool,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl HarvestOrchestrator {
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let controller = Arc::new(RetryController::new(
            fetcher,
            config.stealth.proxy_list.clone().unwrap_or_default(),
            config.harvest.retry_attempts,
            config.stealth.randomize_user_agents,
        ));

        let mut providers = Vec::new();
        let mut drivers = Vec::new();
        for name in &config.engines {
            let provider = provider_by_name(name).ok_or_else(|| {
                HarvestError::ConfigError(format!("Unknown search engine '{}'", name))
            })?;
            providers.push(provider);
            drivers.push(SourceDriver::new(
                provider,
                controller.clone(),
                config.harvest.links_per_page,
                config.harvest.link_delay_range,
            )?);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);

        Ok(Self {
            providers,
            drivers,
            max_pages: config.harvest.max_pages,
            engine_switch_delay_ms: config.harvest.engine_switch_delay_range,
            expand: config.harvest.expand_query,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        })
    }

    /// Handle for stopping the run from outside; checked at every
    /// variant/provider/page/link boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    pub async fn run(&self, query: &str) -> Result<(ResultSet, RunReport)> {
        let query = query.trim();
        if query.is_empty() {
            return Err(
                HarvestError::ConfigError("Search query cannot be empty".to_string()).into(),
            );
        }

        let started_at = Utc::now();
        let clock = Instant::now();
        let signal = CancelSignal {
            rx: self.cancel_rx.clone(),
        };

        let variants = if self.expand {
            expand_query(query)
        } else {
            vec![query.to_string()]
        };

        info!("Starting email harvest for query: {}", query);
        info!(
            "Using {} engines, {} pages each, {} query variants",
            self.providers.len(),
            self.max_pages,
            variants.len()
        );

        let mut results = ResultSet::new();

        'run: for variant in &variants {
            debug!("Processing query variant: {}", variant);

            for (index, driver) in self.drivers.iter().enumerate() {
                if signal.is_cancelled() {
                    info!("Run cancelled, stopping before {}", self.providers[index].name);
                    break 'run;
                }

                let provider = self.providers[index];

                // staggered page batch for this provider, joined as a unit
                let mut page_futures = Vec::new();
                let mut start_offset_ms = 0u64;
                for page_index in 0..self.max_pages {
                    start_offset_ms += {
                        let mut rng = rand::thread_rng();
                        rng.gen_range(provider.pacing_ms.0..=provider.pacing_ms.1)
                    };
                    let delay = Duration::from_millis(start_offset_ms);
                    let signal = signal.clone();
                    let variant = variant.as_str();
                    page_futures.push(async move {
                        sleep(delay).await;
                        if signal.is_cancelled() {
                            return Default::default();
                        }
                        driver.run(variant, page_index, &signal).await
                    });
                }

                // the sole ResultSet mutation point
                for page_emails in join_all(page_futures).await {
                    results.merge(page_emails);
                }

                info!(
                    "Found {} unique emails so far ({}, variant \"{}\")",
                    results.len(),
                    provider.name,
                    variant
                );

                if !signal.is_cancelled() {
                    let pause = {
                        let mut rng = rand::thread_rng();
                        rng.gen_range(
                            self.engine_switch_delay_ms.0..=self.engine_switch_delay_ms.1,
                        )
                    };
                    debug!("Pausing {}ms before next engine", pause);
                    sleep(Duration::from_millis(pause)).await;
                }
            }
        }

        let report = RunReport::new(query, started_at, clock.elapsed(), results.len());
        info!(
            "Harvest finished: {} unique emails for query \"{}\"",
            report.total_emails, report.query
        );

        Ok((results, report))
    }
}
