use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CrawlError;

/// Outcome of probing a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    NotVisited,
    Visited,
    NoSuchDomain,
    NoSuchPage,
    HttpInsteadOfHttps,
    OtherError,
}

impl LinkStatus {
    /// Lowercase name as it appears in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::NotVisited => "not_visited",
            LinkStatus::Visited => "visited",
            LinkStatus::NoSuchDomain => "no_such_domain",
            LinkStatus::NoSuchPage => "no_such_page",
            LinkStatus::HttpInsteadOfHttps => "http_instead_of_https",
            LinkStatus::OtherError => "other_error",
        }
    }

    /// Broken links go to the broken registry, fetch errors to their own.
    pub fn is_broken(&self) -> bool {
        matches!(
            self,
            LinkStatus::NoSuchDomain | LinkStatus::NoSuchPage | LinkStatus::HttpInsteadOfHttps
        )
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers in task log lines apply
        f.pad(self.as_str())
    }
}

/// A discovered link: the unit of work the queue and workers pass around.
///
/// Identity derives from `url` alone so rediscoveries of the same canonical
/// URL dedup against each other regardless of depth or parent page.
#[derive(Debug, Clone)]
pub struct Task {
    pub url: String,
    pub depth: u32,
    pub first_found_on: String,
    pub status: LinkStatus,
    pub error: String,
}

impl Task {
    /// `first_found_on` value carried by the seed task.
    pub const SEED_ORIGIN: &'static str = "target_url";

    pub fn new(url: impl Into<String>, depth: u32, first_found_on: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            first_found_on: first_found_on.into(),
            status: LinkStatus::NotVisited,
            error: String::new(),
        }
    }

    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, 0, Self::SEED_ORIGIN)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:20}, depth = {}: {} ==> {}",
            self.status, self.depth, self.first_found_on, self.url
        )?;
        if self.status == LinkStatus::OtherError {
            write!(f, ", error: {}", self.error)?;
        }
        Ok(())
    }
}

/// Bounded exponential backoff between fetch attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: u64,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            multiplier: 5,
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(5),
        }
    }
}

/// Per-worker HTTP session settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub tls_verify: bool,
    /// Empty means pick a desktop UA for the host platform.
    pub user_agent: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            tls_verify: false,
            user_agent: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Everything the engine hands back to reporters when a crawl completes.
#[derive(Debug)]
pub struct CrawlSummary {
    pub broken_links: Vec<Task>,
    pub fetch_error_links: Vec<Task>,
    pub processed_count: u64,
    pub discovered_count: u64,
    pub elapsed: String,
}

/// One worker's task handler. Workers own their processor: `initiate` runs
/// once per worker before the first task (builds the per-worker HTTP
/// client), `process` turns one task into child tasks, `finalize` runs
/// after the queue drains.
#[async_trait]
pub trait Processor: Send {
    async fn initiate(&mut self);
    async fn process(&mut self, task: &mut Task) -> Result<Vec<Task>, CrawlError>;
    async fn finalize(&mut self);
}

/// Reporter contract. `visited_count` is the number of unique tasks
/// admitted to the queue; `broken` and `fetch_errors` are disjoint and
/// every listed task carries a terminal status and its parent URL.
pub trait Report {
    fn generate(
        &self,
        target_url: &str,
        broken: &[Task],
        fetch_errors: &[Task],
        elapsed: &str,
        visited_count: u64,
        workers_num: usize,
    ) -> String;
}

/// Format a duration as `HH:MM:SS.ss`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let hours = (total / 3600.0) as u64;
    let minutes = ((total % 3600.0) / 60.0) as u64;
    let seconds = total % 60.0;
    format!("{hours:02}:{minutes:02}:{seconds:05.2}")
}
