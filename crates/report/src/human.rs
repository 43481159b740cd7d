//! Plain-text report for reading in a terminal or an email body.

use chrono::Local;
use tracing::info;

use linkprobe_core::{Report, Task};

pub struct HumanReport;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

impl HumanReport {
    fn render_section(out: &mut String, title: &str, links: &[Task]) {
        out.push_str(&format!("{title}:\n"));
        out.push_str(THIN_RULE);
        out.push('\n');
        if links.is_empty() {
            out.push_str("(none)\n");
            out.push_str(THIN_RULE);
            out.push('\n');
            return;
        }
        for (i, link) in links.iter().enumerate() {
            out.push_str(&format!("[{}] URL         : {}\n", i + 1, link.url));
            out.push_str(&format!("     Depth       : {}\n", link.depth));
            out.push_str(&format!("     Appeared In : {}\n", link.first_found_on));
            out.push_str(&format!("     Status      : {}\n", link.status));
            out.push_str(&format!("     Error       : {}\n", link.error));
            out.push_str(THIN_RULE);
            out.push('\n');
        }
    }
}

impl Report for HumanReport {
    fn generate(
        &self,
        target_url: &str,
        broken: &[Task],
        fetch_errors: &[Task],
        elapsed: &str,
        visited_count: u64,
        workers_num: usize,
    ) -> String {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S %z");

        let mut out = String::new();
        out.push_str("Crawler Report\n");
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("Generated at     : {generated_at}\n"));
        out.push_str(&format!("Execution Time   : {elapsed}\n"));
        out.push_str(&format!("Target URL       : {target_url}\n"));
        out.push_str(&format!("Visited URLs     : {visited_count}\n"));
        out.push_str(&format!("Broken URLs      : {}\n", broken.len()));
        out.push_str(&format!("Fetch Errors     : {}\n", fetch_errors.len()));
        out.push_str(&format!("Workers Used     : {workers_num}\n"));
        out.push_str(RULE);
        out.push_str("\n\n");

        Self::render_section(&mut out, "Broken Links", broken);
        out.push('\n');
        Self::render_section(&mut out, "Fetch Errors", fetch_errors);

        info!("human-readable report generated");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkprobe_core::LinkStatus;

    #[test]
    fn test_report_lists_summary_and_links() {
        let mut broken = Task::new("https://a.test/missing", 2, "https://a.test/");
        broken.status = LinkStatus::NoSuchPage;
        let mut err = Task::new("https://b.test/", 1, "https://a.test/");
        err.status = LinkStatus::OtherError;
        err.error = "request timed out".to_string();

        let report = HumanReport.generate(
            "https://a.test/",
            &[broken],
            &[err],
            "00:00:03.25",
            7,
            4,
        );

        assert!(report.contains("Target URL       : https://a.test/"));
        assert!(report.contains("Visited URLs     : 7"));
        assert!(report.contains("Broken URLs      : 1"));
        assert!(report.contains("Workers Used     : 4"));
        assert!(report.contains("[1] URL         : https://a.test/missing"));
        assert!(report.contains("Status      : no_such_page"));
        assert!(report.contains("Error       : request timed out"));
    }

    #[test]
    fn test_empty_sections_say_none() {
        let report = HumanReport.generate("https://a.test/", &[], &[], "00:00:00.10", 1, 1);
        assert!(report.contains("(none)"));
    }
}
