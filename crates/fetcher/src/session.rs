//! Per-worker HTTP session construction.
//!
//! Each worker owns one client so connections are reused across the tasks
//! that worker processes; nothing is shared between workers.

use reqwest::redirect::Policy;
use reqwest::Client;

use linkprobe_core::{CrawlError, FetchOptions};

/// OS component of the User-Agent, picked for the host platform.
pub fn os_fragment() -> &'static str {
    if cfg!(target_os = "windows") {
        "Windows NT 10.0; Win64; x64"
    } else if cfg!(target_os = "macos") {
        "Macintosh; Intel Mac OS X 10_15_7"
    } else if cfg!(target_os = "linux") {
        "X11; Linux x86_64"
    } else {
        "X11; Unknown OS"
    }
}

/// Desktop-class User-Agent so servers answer the way they answer browsers.
pub fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 ({}; rv:128.0) Gecko/20100101 Firefox/128.0",
        os_fragment()
    )
}

/// Build one worker's client: persistent connections, bounded redirect
/// following, request timeout, TLS verification per config (relaxed by
/// default: the crawler tests reachability, not certificate hygiene).
pub fn build_client(options: &FetchOptions) -> Result<Client, CrawlError> {
    let user_agent = options
        .user_agent
        .clone()
        .unwrap_or_else(default_user_agent);

    Client::builder()
        .user_agent(user_agent)
        .timeout(options.timeout)
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(!options.tls_verify)
        .build()
        .map_err(|e| CrawlError::Network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_platform_fragment() {
        let ua = default_user_agent();
        assert!(ua.starts_with("Mozilla/5.0 ("));
        assert!(ua.contains(os_fragment()));
        assert!(ua.ends_with("Firefox/128.0"));
    }

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(build_client(&FetchOptions::default()).is_ok());
    }

    #[test]
    fn test_explicit_user_agent_wins() {
        let options = FetchOptions {
            user_agent: Some("probe/1".to_string()),
            ..FetchOptions::default()
        };
        assert!(build_client(&options).is_ok());
    }
}
