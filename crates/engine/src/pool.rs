//! Fixed-size worker pool over the dedup queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use linkprobe_core::Processor;
use linkprobe_frontier::DedupQueue;

/// Spawn one worker per processor. Each worker builds its per-worker
/// state (`initiate`), then drains the queue until the shutdown sentinel:
/// process, enqueue children, bump the processed counter, mark done.
/// Processor errors are fatal only to the task that hit them.
pub fn spawn_workers<P>(
    queue: Arc<DedupQueue>,
    processed: Arc<AtomicU64>,
    processors: Vec<P>,
) -> Vec<JoinHandle<()>>
where
    P: Processor + 'static,
{
    processors
        .into_iter()
        .enumerate()
        .map(|(worker_id, mut processor)| {
            let queue = Arc::clone(&queue);
            let processed = Arc::clone(&processed);
            tokio::spawn(async move {
                debug!(worker_id, "worker starting");
                processor.initiate().await;

                while let Some(mut task) = queue.take().await {
                    match processor.process(&mut task).await {
                        Ok(children) => {
                            for child in children {
                                queue.put(child).await;
                            }
                        }
                        Err(e) => {
                            warn!(worker_id, url = %task.url, "processor error: {e}");
                        }
                    }
                    processed.fetch_add(1, Ordering::Relaxed);
                    queue.done().await;
                }

                processor.finalize().await;
                debug!(worker_id, "worker finished");
            })
        })
        .collect()
}
