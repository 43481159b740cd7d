//! robots.txt handling.
//!
//! Only `Crawl-delay` for user-agent `*` feeds back into the crawl.
//! Disallow rules are parsed and retained but not enforced; this checker
//! visits every link it finds so it can report on it.

use std::time::Duration;

use robotstxt::{parse_robotstxt, RobotsParseHandler};

/// What a host's robots.txt said, reduced to the parts we keep.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    pub crawl_delay: Option<Duration>,
    pub disallow: Vec<String>,
}

impl RobotsPolicy {
    /// Allow-all policy used when robots.txt cannot be fetched or parsed.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> Duration {
        self.crawl_delay.unwrap_or(Duration::ZERO)
    }

    pub fn parse(body: &str) -> Self {
        let mut collector = StarGroupCollector::default();
        parse_robotstxt(body, &mut collector);
        RobotsPolicy {
            crawl_delay: collector.crawl_delay.map(Duration::from_secs_f64),
            disallow: collector.disallow,
        }
    }
}

/// Collects rules for the `*` group. A user-agent line that follows rules
/// starts a new group; consecutive user-agent lines stack onto one group.
#[derive(Default)]
struct StarGroupCollector {
    star_group: bool,
    rules_seen_in_group: bool,
    crawl_delay: Option<f64>,
    disallow: Vec<String>,
}

impl StarGroupCollector {
    fn enter_rule(&mut self) -> bool {
        self.rules_seen_in_group = true;
        self.star_group
    }
}

impl RobotsParseHandler for StarGroupCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        if self.rules_seen_in_group {
            self.star_group = false;
            self.rules_seen_in_group = false;
        }
        if user_agent.trim() == "*" {
            self.star_group = true;
        }
    }

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {
        self.enter_rule();
    }

    fn handle_disallow(&mut self, _line_num: u32, value: &str) {
        if self.enter_rule() && !value.is_empty() {
            self.disallow.push(value.to_string());
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &str) {}

    fn handle_unknown_action(&mut self, _line_num: u32, action: &str, value: &str) {
        if self.enter_rule() && action.eq_ignore_ascii_case("crawl-delay") {
            if let Ok(seconds) = value.trim().parse::<f64>() {
                if seconds.is_finite() && seconds >= 0.0 {
                    self.crawl_delay = Some(seconds);
                }
            }
        }
    }
}
