//! The link-checking processor: fetcher and extractor composed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};
use url::Url;

use linkprobe_core::{CrawlConfig, CrawlError, LinkStatus, Processor, Task};
use linkprobe_fetcher::{build_client, DomainGate, FetchFailure, Fetcher};
use linkprobe_parser::parse_page;

use crate::registry::Registries;

/// Processes one task end to end: polite HEAD probe, optional body fetch,
/// link extraction, and terminal-status bookkeeping. Each worker owns one
/// of these; the HTTP client is built in `initiate`.
pub struct LinkCrawler {
    config: Arc<CrawlConfig>,
    target: Url,
    gate: Arc<DomainGate>,
    registries: Arc<Registries>,
    fetcher: Option<Fetcher>,
}

impl LinkCrawler {
    pub fn new(
        config: Arc<CrawlConfig>,
        gate: Arc<DomainGate>,
        registries: Arc<Registries>,
    ) -> Result<Self, CrawlError> {
        let target = Url::parse(&config.target_url)
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {e}", config.target_url)))?;
        Ok(Self {
            config,
            target,
            gate,
            registries,
            fetcher: None,
        })
    }

    /// Stamp the task and file it in the registry for its status. A task
    /// is filed at most once; later classifications of the same task are
    /// dropped so the registries stay disjoint.
    async fn add_error_to_report(
        &self,
        task: &mut Task,
        status: LinkStatus,
        error: String,
        recorded: &mut bool,
    ) {
        if *recorded {
            debug!(url = %task.url, status = %status, "already filed, keeping first classification");
            return;
        }
        task.status = status;
        task.error = error;
        if status == LinkStatus::OtherError {
            warn!(url = %task.url, error = %task.error, "adding to fetch errors");
        } else {
            debug!(url = %task.url, status = %status, "adding to broken links");
        }
        self.registries.record(task.clone()).await;
        *recorded = true;
    }
}

#[async_trait]
impl Processor for LinkCrawler {
    async fn initiate(&mut self) {
        match build_client(&self.config.fetch) {
            Ok(client) => {
                self.fetcher = Some(Fetcher::new(
                    client,
                    Arc::clone(&self.gate),
                    Arc::clone(&self.config),
                ));
            }
            Err(e) => error!("failed to build HTTP client: {e}"),
        }
    }

    async fn process(&mut self, task: &mut Task) -> Result<Vec<Task>, CrawlError> {
        let Some(fetcher) = &self.fetcher else {
            return Err(CrawlError::Network("worker has no HTTP client".to_string()));
        };

        debug!(task = %task, "handling");
        let outcome = fetcher.fetch(task).await;

        let mut recorded = false;
        if outcome.https_downgrade {
            self.add_error_to_report(
                task,
                LinkStatus::HttpInsteadOfHttps,
                String::new(),
                &mut recorded,
            )
            .await;
        }

        match outcome.result {
            Ok(None) => {
                if !recorded {
                    task.status = LinkStatus::Visited;
                }
                Ok(Vec::new())
            }
            Ok(Some(body)) => {
                if !recorded {
                    task.status = LinkStatus::Visited;
                }
                Ok(parse_page(&body, task, &self.target, self.config.max_depth))
            }
            Err(failure) => {
                let (status, error) = match failure {
                    FetchFailure::NoSuchPage => (LinkStatus::NoSuchPage, String::new()),
                    FetchFailure::NoSuchDomain(_) => (LinkStatus::NoSuchDomain, String::new()),
                    FetchFailure::Other(detail) => (LinkStatus::OtherError, detail),
                };
                self.add_error_to_report(task, status, error, &mut recorded).await;
                Ok(Vec::new())
            }
        }
    }

    async fn finalize(&mut self) {
        self.fetcher = None;
    }
}
