//! The probe-and-fetch pipeline for one task.
//!
//! Every task gets a HEAD probe; only on-site HTML pages below the depth
//! limit get a body GET. The whole probe+fetch block sits inside a retry
//! loop with bounded exponential backoff; a 404 is terminal on the first
//! sighting, everything else gets retried until attempts run out.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use linkprobe_core::{CrawlConfig, RetryPolicy, Task};

use crate::politeness::DomainGate;
use crate::retry::Backoff;

/// Resolver messages that mean the host does not exist, per platform:
/// Windows winsock, POSIX getaddrinfo, BSD/macOS, OS/2, and the generic
/// marker hyper puts on resolution failures.
const DNS_FAILURE_MARKERS: &[&str] = &[
    "getaddrinfo failed",
    "Name or service not known",
    "nodename nor servname provided, or not known",
    "Host not found",
    "dns error",
];

/// Terminal classification of a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// 404 from HEAD or GET.
    NoSuchPage,
    /// Hostname did not resolve.
    NoSuchDomain(String),
    /// Timeout, non-404 HTTP error, or unclassified connection trouble.
    Other(String),
}

impl FetchFailure {
    /// 404 is the one terminal answer; everything else may be transient.
    pub fn should_retry(&self) -> bool {
        !matches!(self, FetchFailure::NoSuchPage)
    }

    pub fn detail(&self) -> &str {
        match self {
            FetchFailure::NoSuchPage => "404 not found",
            FetchFailure::NoSuchDomain(detail) | FetchFailure::Other(detail) => detail,
        }
    }
}

/// What one task's fetch produced. The downgrade flag is orthogonal to
/// the result: an `http://` URL that redirected to `https://` is worth
/// reporting even when the fetch itself went on to succeed.
#[derive(Debug)]
pub struct FetchOutcome {
    pub https_downgrade: bool,
    /// `Ok(None)`: probed fine, nothing to parse (non-HTML, off-site,
    /// excluded host, or at the depth limit). `Ok(Some(body))`: page body
    /// for link extraction.
    pub result: Result<Option<Vec<u8>>, FetchFailure>,
}

/// One worker's fetch pipeline: its own HTTP session plus shared
/// politeness state.
pub struct Fetcher {
    client: Client,
    gate: Arc<DomainGate>,
    config: Arc<CrawlConfig>,
}

impl Fetcher {
    pub fn new(client: Client, gate: Arc<DomainGate>, config: Arc<CrawlConfig>) -> Self {
        Self {
            client,
            gate,
            config,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.fetch.retry
    }

    /// Run the probe+fetch block under the retry policy.
    pub async fn fetch(&self, task: &Task) -> FetchOutcome {
        let host = match Url::parse(&task.url).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => host,
            None => {
                return FetchOutcome {
                    https_downgrade: false,
                    result: Err(FetchFailure::Other(format!(
                        "no host in URL {}",
                        task.url
                    ))),
                }
            }
        };

        let policy = self.retry_policy();
        let mut backoff = Backoff::new(policy);
        let mut downgrade = false;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.attempt(task, &host, &mut downgrade).await {
                Ok(body) => {
                    return FetchOutcome {
                        https_downgrade: downgrade,
                        result: Ok(body),
                    }
                }
                Err(failure) => {
                    if !failure.should_retry() || attempt >= policy.max_attempts {
                        return FetchOutcome {
                            https_downgrade: downgrade,
                            result: Err(failure),
                        };
                    }
                    let wait = backoff.next_wait();
                    debug!(
                        url = %task.url,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "fetch failed, retrying: {}",
                        failure.detail()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// One pass over the pipeline: HEAD probe, downgrade check, then the
    /// filters that decide whether a body GET happens at all.
    async fn attempt(
        &self,
        task: &Task,
        host: &str,
        downgrade: &mut bool,
    ) -> Result<Option<Vec<u8>>, FetchFailure> {
        self.gate.pass(&self.client, host).await;
        let head = self
            .client
            .head(&task.url)
            .send()
            .await
            .map_err(classify_transport)?
            .error_for_status()
            .map_err(classify_transport)?;

        if is_https_downgrade(&task.url, head.url().as_str()) {
            *downgrade = true;
        }

        let content_type = head
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("text/html") {
            debug!(url = %task.url, content_type, "not an HTML page, probe only");
            return Ok(None);
        }

        if !task.url.starts_with(&self.config.target_url) {
            debug!(url = %task.url, "off-site, probe only");
            return Ok(None);
        }

        if self.config.non_crawling_domains.contains(host) {
            debug!(url = %task.url, host, "host excluded from crawling, probe only");
            return Ok(None);
        }

        if task.depth == self.config.max_depth {
            debug!(url = %task.url, depth = task.depth, "at depth limit, probe only");
            return Ok(None);
        }

        self.gate.pass(&self.client, host).await;
        let resp = self
            .client
            .get(&task.url)
            .send()
            .await
            .map_err(classify_transport)?
            .error_for_status()
            .map_err(classify_transport)?;
        let body = resp.bytes().await.map_err(classify_transport)?;
        Ok(Some(body.to_vec()))
    }
}

/// A plaintext URL that ended on an https final URL after redirects.
pub fn is_https_downgrade(original: &str, final_url: &str) -> bool {
    original.starts_with("http://") && final_url.starts_with("https://")
}

fn classify_transport(err: reqwest::Error) -> FetchFailure {
    if err.status() == Some(StatusCode::NOT_FOUND) {
        return FetchFailure::NoSuchPage;
    }
    if let Some(status) = err.status() {
        return FetchFailure::Other(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        ));
    }
    if err.is_timeout() {
        return FetchFailure::Other("request timed out".to_string());
    }
    if error_chain_matches(&err, DNS_FAILURE_MARKERS) {
        return FetchFailure::NoSuchDomain(err.to_string());
    }
    FetchFailure::Other(err.to_string())
}

/// Walk an error and its sources looking for any of the given markers.
fn error_chain_matches(err: &(dyn std::error::Error + 'static), markers: &[&str]) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if markers.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct FakeError {
        message: String,
        source: Option<Box<FakeError>>,
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl std::error::Error for FakeError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_ref()
                .map(|s| s as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_only_404_is_terminal_for_retry() {
        assert!(!FetchFailure::NoSuchPage.should_retry());
        assert!(FetchFailure::NoSuchDomain("nx".into()).should_retry());
        assert!(FetchFailure::Other("timeout".into()).should_retry());
    }

    #[test]
    fn test_https_downgrade_detection() {
        assert!(is_https_downgrade(
            "http://example.test/",
            "https://example.test/"
        ));
        assert!(!is_https_downgrade(
            "https://example.test/",
            "https://example.test/"
        ));
        assert!(!is_https_downgrade(
            "http://example.test/",
            "http://example.test/final"
        ));
    }

    #[test]
    fn test_dns_marker_found_deep_in_error_chain() {
        let err = FakeError {
            message: "error sending request".to_string(),
            source: Some(Box::new(FakeError {
                message: "client error (Connect)".to_string(),
                source: Some(Box::new(FakeError {
                    message: "dns error: failed to lookup address information: \
                              Name or service not known"
                        .to_string(),
                    source: None,
                })),
            })),
        };
        assert!(error_chain_matches(&err, DNS_FAILURE_MARKERS));
    }

    #[test]
    fn test_unrelated_error_chain_does_not_match() {
        let err = FakeError {
            message: "connection reset by peer".to_string(),
            source: None,
        };
        assert!(!error_chain_matches(&err, DNS_FAILURE_MARKERS));
    }
}
