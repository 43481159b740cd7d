//! Crawl-wide result registries.
//!
//! Two append-only lists under separate locks: broken links (missing
//! pages, dead domains, https downgrades) and fetch errors (everything
//! else that terminally failed). A task lands in exactly one of them.

use tokio::sync::Mutex;

use linkprobe_core::Task;

#[derive(Debug, Default)]
pub struct Registries {
    broken: Mutex<Vec<Task>>,
    fetch_errors: Mutex<Vec<Task>>,
}

impl Registries {
    /// File a terminally classified task under the registry its status
    /// belongs to.
    pub async fn record(&self, task: Task) {
        if task.status.is_broken() {
            self.broken.lock().await.push(task);
        } else {
            self.fetch_errors.lock().await.push(task);
        }
    }

    pub async fn broken_count(&self) -> usize {
        self.broken.lock().await.len()
    }

    pub async fn fetch_error_count(&self) -> usize {
        self.fetch_errors.lock().await.len()
    }

    /// Drain both lists; called once when the crawl has quiesced.
    pub async fn take(&self) -> (Vec<Task>, Vec<Task>) {
        let broken = std::mem::take(&mut *self.broken.lock().await);
        let fetch_errors = std::mem::take(&mut *self.fetch_errors.lock().await);
        (broken, fetch_errors)
    }
}
