//! Top-level crawl orchestration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::info;

use linkprobe_core::{format_elapsed, CrawlConfig, CrawlError, CrawlSummary, Task};
use linkprobe_fetcher::DomainGate;
use linkprobe_frontier::DedupQueue;

use crate::crawler::LinkCrawler;
use crate::pool::spawn_workers;
use crate::registry::Registries;

/// Wires queue, workers, politeness state and registries for one crawl.
/// `run` drives the crawl to quiescence and hands back everything the
/// reporters need.
pub struct CrawlEngine {
    config: Arc<CrawlConfig>,
}

impl CrawlEngine {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let started = Instant::now();

        let queue = Arc::new(DedupQueue::new());
        let gate = Arc::new(DomainGate::new());
        let registries = Arc::new(Registries::default());
        let processed = Arc::new(AtomicU64::new(0));

        queue.put(Task::seed(self.config.target_url.clone())).await;

        let mut processors = Vec::with_capacity(self.config.workers_num);
        for _ in 0..self.config.workers_num {
            processors.push(LinkCrawler::new(
                Arc::clone(&self.config),
                Arc::clone(&gate),
                Arc::clone(&registries),
            )?);
        }

        info!(
            target = %self.config.target_url,
            workers = self.config.workers_num,
            "starting crawl"
        );
        let handles = spawn_workers(Arc::clone(&queue), Arc::clone(&processed), processors);

        let ticker = if self.config.silent {
            None
        } else {
            Some(self.spawn_progress_ticker(
                Arc::clone(&queue),
                Arc::clone(&registries),
                Arc::clone(&processed),
            ))
        };

        queue.join().await;
        queue.shutdown().await;
        for handle in handles {
            let _ = handle.await;
        }
        if let Some(ticker) = ticker {
            ticker.abort();
        }

        let (broken_links, fetch_error_links) = registries.take().await;
        let summary = CrawlSummary {
            processed_count: processed.load(Ordering::Relaxed),
            discovered_count: queue.discovered().await,
            elapsed: format_elapsed(started.elapsed()),
            broken_links,
            fetch_error_links,
        };

        info!(
            broken = summary.broken_links.len(),
            fetch_errors = summary.fetch_error_links.len(),
            processed = summary.processed_count,
            discovered = summary.discovered_count,
            elapsed = %summary.elapsed,
            "crawl complete"
        );
        Ok(summary)
    }

    fn spawn_progress_ticker(
        &self,
        queue: Arc<DedupQueue>,
        registries: Arc<Registries>,
        processed: Arc<AtomicU64>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(2));
            interval.tick().await;
            loop {
                interval.tick().await;
                let broken = registries.broken_count().await;
                let fetch_errors = registries.fetch_error_count().await;
                let processed_count = processed.load(Ordering::Relaxed);
                let discovered = queue.discovered().await;
                let queued = queue.len().await;
                info!(
                    broken = broken,
                    fetch_errors = fetch_errors,
                    processed = processed_count,
                    discovered = discovered,
                    queued = queued,
                    "crawl progress"
                );
            }
        })
    }
}
