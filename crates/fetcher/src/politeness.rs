//! Per-domain politeness.
//!
//! Every outbound request passes through the gate for its host. The first
//! pass lazily fetches `https://<host>/robots.txt` (any failure means
//! allow-all); subsequent passes sleep out whatever remains of the host's
//! crawl-delay since the previous request. Host entries and their locks
//! are created on first use. The host lock covers the robots lookup and
//! the sleep accounting only, never the caller's actual HEAD or GET.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use crate::robots::RobotsPolicy;

#[derive(Debug, Default)]
struct HostState {
    robots: Option<RobotsPolicy>,
    last_access: Option<Instant>,
}

#[derive(Default)]
pub struct DomainGate {
    hosts: DashMap<String, Arc<Mutex<HostState>>>,
}

impl DomainGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn host_entry(&self, host: &str) -> Arc<Mutex<HostState>> {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HostState::default())))
            .clone()
    }

    /// Wait until `host` may be contacted again, then stamp the access.
    /// Returns once the caller is clear to issue its request.
    pub async fn pass(&self, client: &Client, host: &str) {
        let entry = self.host_entry(host);
        let mut state = entry.lock().await;

        if state.robots.is_none() {
            state.robots = Some(Self::load_robots(client, host).await);
        }
        let delay = state
            .robots
            .as_ref()
            .map(RobotsPolicy::delay)
            .unwrap_or_default();

        if let Some(last) = state.last_access {
            let next_allowed = last + delay;
            let now = Instant::now();
            if next_allowed > now {
                let wait = next_allowed - now;
                debug!(host, wait_ms = wait.as_millis() as u64, "honoring crawl-delay");
                tokio::time::sleep(wait).await;
            }
        }
        state.last_access = Some(Instant::now());
    }

    async fn load_robots(client: &Client, host: &str) -> RobotsPolicy {
        let robots_url = format!("https://{host}/robots.txt");
        let body = match client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => resp.text().await.ok(),
            Ok(resp) => {
                debug!(host, status = %resp.status(), "robots.txt unavailable, allowing all");
                None
            }
            Err(e) => {
                debug!(host, "robots.txt fetch failed, allowing all: {e}");
                None
            }
        };
        match body {
            Some(text) => RobotsPolicy::parse(&text),
            None => RobotsPolicy::allow_all(),
        }
    }

    /// Number of hosts seen so far.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    #[cfg(test)]
    async fn preload(&self, host: &str, policy: RobotsPolicy) {
        let entry = self.host_entry(host);
        entry.lock().await.robots = Some(policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_consecutive_passes_honor_crawl_delay() {
        let gate = DomainGate::new();
        let policy = RobotsPolicy {
            crawl_delay: Some(Duration::from_millis(300)),
            disallow: Vec::new(),
        };
        gate.preload("slow.test", policy).await;

        let client = client();
        let start = Instant::now();
        gate.pass(&client, "slow.test").await;
        gate.pass(&client, "slow.test").await;
        assert!(
            start.elapsed() >= Duration::from_millis(300),
            "second pass must wait out the crawl-delay"
        );
    }

    #[tokio::test]
    async fn test_zero_delay_does_not_block() {
        let gate = DomainGate::new();
        gate.preload("fast.test", RobotsPolicy::allow_all()).await;

        let client = client();
        let start = Instant::now();
        for _ in 0..5 {
            gate.pass(&client, "fast.test").await;
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_hosts_are_isolated() {
        let gate = DomainGate::new();
        gate.preload(
            "slow.test",
            RobotsPolicy {
                crawl_delay: Some(Duration::from_secs(5)),
                disallow: Vec::new(),
            },
        )
        .await;
        gate.preload("fast.test", RobotsPolicy::allow_all()).await;

        let client = client();
        gate.pass(&client, "slow.test").await;
        let start = Instant::now();
        gate.pass(&client, "fast.test").await;
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "another host's delay must not apply"
        );
        assert_eq!(gate.len(), 2);
    }
}
