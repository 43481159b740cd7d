//! Machine-readable report.

use chrono::Utc;
use serde_json::json;
use tracing::info;

use linkprobe_core::{Report, Task};

pub struct JsonReport;

fn link_object(link: &Task) -> serde_json::Value {
    json!({
        "url": link.url,
        "depth": link.depth,
        "appeared_in": link.first_found_on,
        "status": link.status.as_str(),
        "error": link.error,
    })
}

impl Report for JsonReport {
    fn generate(
        &self,
        target_url: &str,
        broken: &[Task],
        fetch_errors: &[Task],
        elapsed: &str,
        visited_count: u64,
        workers_num: usize,
    ) -> String {
        let report = json!({
            "report_generated_at": Utc::now().to_rfc3339(),
            "execution_time": elapsed,
            "target_url": target_url,
            "visited_urls": visited_count,
            "workers_used": workers_num,
            "broken_links": broken.iter().map(link_object).collect::<Vec<_>>(),
            "fetch_errors": fetch_errors.iter().map(link_object).collect::<Vec<_>>(),
        });

        info!("JSON report generated");
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
    }
}
