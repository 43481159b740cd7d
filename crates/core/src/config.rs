use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use crate::canonical::canonicalize_seed;
use crate::error::CrawlError;
use crate::types::{FetchOptions, RetryPolicy};

/// Worker count used when the caller passes the `-1` sentinel.
pub const DEFAULT_WORKERS: usize = 25;

/// Resolved inputs for one crawl. Sentinels from the CLI layer are gone by
/// the time this exists: depth is `u32::MAX` for unbounded, workers is a
/// concrete count >= 1, the target URL is canonical.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub target_url: String,
    pub max_depth: u32,
    pub workers_num: usize,
    pub non_crawling_domains: HashSet<String>,
    pub fetch: FetchOptions,
    pub silent: bool,
}

impl CrawlConfig {
    /// Build a config from raw caller inputs. `max_depth == -1` means
    /// unbounded, `workers_num == -1` means the engine default; worker
    /// counts below 1 are clamped to 1.
    pub fn new(
        target_url: &str,
        max_depth: i64,
        workers_num: i64,
        non_crawling_domains: HashSet<String>,
    ) -> Result<Self, CrawlError> {
        let target_url = canonicalize_seed(target_url)?;
        let max_depth = if max_depth < 0 {
            u32::MAX
        } else {
            u32::try_from(max_depth).unwrap_or(u32::MAX)
        };
        let workers_num = if workers_num == -1 {
            DEFAULT_WORKERS
        } else {
            usize::try_from(workers_num.max(1)).unwrap_or(1)
        };
        Ok(Self {
            target_url,
            max_depth,
            workers_num,
            non_crawling_domains,
            fetch: FetchOptions::default(),
            silent: false,
        })
    }
}

/// File-level configuration (TOML). Every field has a default so a partial
/// or missing file works; the CLI layer overrides on top.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub http: HttpConfig,
    pub scope: ScopeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    /// -1 picks the engine default.
    pub workers_num: i64,
    /// -1 means unbounded.
    pub max_depth: i64,
    pub silent: bool,
    /// Report kinds to render ("human", "json").
    pub reports: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            workers_num: -1,
            max_depth: -1,
            silent: false,
            reports: vec!["human".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_seconds: u64,
    /// Off by default: the crawler tests reachability, not certificates.
    pub tls_verify: bool,
    /// Empty picks a desktop UA for the host platform.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            tls_verify: false,
            user_agent: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ScopeConfig {
    /// Hosts that are probed but never body-fetched.
    pub non_crawling_domains: Vec<String>,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, CrawlError> {
        toml::from_str(content).map_err(|e| CrawlError::Config(e.to_string()))
    }

    /// Fetch options described by the `[http]` section.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.http.request_timeout_seconds),
            tls_verify: self.http.tls_verify,
            user_agent: if self.http.user_agent.is_empty() {
                None
            } else {
                Some(self.http.user_agent.clone())
            },
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_resolve() {
        let cfg = CrawlConfig::new("https://example.test/", -1, -1, HashSet::new()).unwrap();
        assert_eq!(cfg.max_depth, u32::MAX);
        assert_eq!(cfg.workers_num, DEFAULT_WORKERS);

        let cfg = CrawlConfig::new("https://example.test/", 3, 0, HashSet::new()).unwrap();
        assert_eq!(cfg.max_depth, 3);
        assert_eq!(cfg.workers_num, 1);
    }

    #[test]
    fn test_invalid_seed_is_rejected() {
        assert!(CrawlConfig::new("example.test", 1, 1, HashSet::new()).is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg = AppConfig::from_toml("[general]\nmax_depth = 5\n").unwrap();
        assert_eq!(cfg.general.max_depth, 5);
        assert_eq!(cfg.general.workers_num, -1);
        assert_eq!(cfg.http.request_timeout_seconds, 10);
        assert!(!cfg.http.tls_verify);
        assert_eq!(cfg.general.reports, vec!["human".to_string()]);
    }

    #[test]
    fn test_fetch_options_from_http_section() {
        let cfg = AppConfig::from_toml(
            "[http]\nrequest_timeout_seconds = 3\ntls_verify = true\nuser_agent = \"probe/1\"\n",
        )
        .unwrap();
        let opts = cfg.fetch_options();
        assert_eq!(opts.timeout, Duration::from_secs(3));
        assert!(opts.tls_verify);
        assert_eq!(opts.user_agent.as_deref(), Some("probe/1"));
    }
}
