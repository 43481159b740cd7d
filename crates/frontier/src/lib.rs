//! Deduplicating task queue.
//!
//! A FIFO that admits each canonical URL at most once for the lifetime of
//! a crawl, plus the accounting needed to detect global drain: admissions
//! bump an outstanding counter, workers mark tasks done, and `join`
//! resolves once every admitted task has been marked. Admission test,
//! seen-set insert and counter bump share one critical section, so a
//! duplicate `put` racing an admission can never double-enqueue and `join`
//! can never slip past an in-flight admission.

use std::collections::{HashSet, VecDeque};

use tokio::sync::{Mutex, Notify};
use tracing::debug;

use linkprobe_core::Task;

#[derive(Debug, Default)]
struct QueueState {
    queue: VecDeque<Task>,
    seen: HashSet<String>,
    outstanding: usize,
    shutdown: bool,
}

pub struct DedupQueue {
    state: Mutex<QueueState>,
    /// Woken when an item lands in the queue or shutdown is signalled.
    items: Notify,
    /// Woken when the outstanding counter reaches zero.
    drained: Notify,
}

impl Default for DedupQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            items: Notify::new(),
            drained: Notify::new(),
        }
    }

    /// Admit a task unless its URL has been seen before. Returns whether
    /// the task was enqueued; duplicates and post-shutdown puts are no-ops.
    pub async fn put(&self, task: Task) -> bool {
        let mut state = self.state.lock().await;
        if state.shutdown {
            debug!(url = %task.url, "queue is shut down, dropping task");
            return false;
        }
        if !state.seen.insert(task.url.clone()) {
            return false;
        }
        state.outstanding += 1;
        state.queue.push_back(task);
        drop(state);
        self.items.notify_one();
        true
    }

    /// Take the oldest task, waiting if the queue is momentarily empty.
    /// `None` is the shutdown sentinel.
    pub async fn take(&self) -> Option<Task> {
        loop {
            let notified = self.items.notified();
            {
                let mut state = self.state.lock().await;
                if let Some(task) = state.queue.pop_front() {
                    if !state.queue.is_empty() {
                        // Pass the wakeup on: one permit does not cover
                        // several queued items.
                        self.items.notify_one();
                    }
                    return Some(task);
                }
                if state.shutdown {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Mark one admitted task as fully processed.
    pub async fn done(&self) {
        let mut state = self.state.lock().await;
        debug_assert!(state.outstanding > 0, "done() without matching put()");
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 && state.queue.is_empty() {
            drop(state);
            self.drained.notify_waiters();
        }
    }

    /// Wait until every admitted task has been marked done.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            {
                let state = self.state.lock().await;
                if state.outstanding == 0 {
                    return;
                }
            }
            notified.await;
        }
    }

    /// Unblock all takers with the sentinel. Later puts are dropped.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.shutdown = true;
        drop(state);
        self.items.notify_waiters();
    }

    /// Unique tasks admitted over the queue's lifetime.
    pub async fn discovered(&self) -> u64 {
        self.state.lock().await.seen.len() as u64
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.queue.is_empty()
    }
}
