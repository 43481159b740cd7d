//! Self-contained HTML report: summary block plus one table per registry.

use chrono::Local;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::info;

use linkprobe_core::{Report, Task};

pub struct HtmlReport;

const STYLE: &str = "
        body { font-family: Arial, sans-serif; padding: 20px; background-color: #f9f9f9; }
        h1 { color: #333; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; table-layout: fixed; }
        th, td { border: 1px solid #ccc; padding: 8px; text-align: left;
                 vertical-align: top; overflow-wrap: break-word; }
        th { background-color: #f2f2f2; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        .meta { margin-bottom: 20px; }
        .col-num { width: 4ch; }
        .col-url { max-width: 300px; word-break: break-word; }
        .col-depth { width: 6ch; }
        .col-status { width: 21ch; }
        .col-error { width: 24ch; }
";

fn hyperlink(url: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
        encode_double_quoted_attribute(url),
        encode_text(url)
    )
}

fn link_table(out: &mut String, title: &str, links: &[Task]) {
    out.push_str(&format!("    <h2>{}</h2>\n", encode_text(title)));
    out.push_str(
        "    <table>\n        <thead>\n            <tr>\n                <th class=\"col-num\">#</th>\n                <th class=\"col-url\">URL</th>\n                <th class=\"col-depth\">Depth</th>\n                <th>Appeared In</th>\n                <th class=\"col-status\">Status</th>\n                <th class=\"col-error\">Error</th>\n            </tr>\n        </thead>\n        <tbody>\n",
    );
    for (idx, link) in links.iter().enumerate() {
        out.push_str(&format!(
            "            <tr>\n                <td class=\"col-num\">{}</td>\n                <td class=\"col-url\">{}</td>\n                <td class=\"col-depth\">{}</td>\n                <td>{}</td>\n                <td class=\"col-status\">{}</td>\n                <td class=\"col-error\">{}</td>\n            </tr>\n",
            idx + 1,
            hyperlink(&link.url),
            link.depth,
            hyperlink(&link.first_found_on),
            encode_text(link.status.as_str()),
            encode_text(&link.error),
        ));
    }
    out.push_str("        </tbody>\n    </table>\n");
}

impl Report for HtmlReport {
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
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title>Broken Links Crawler Report</title>\n    <style>");
        out.push_str(STYLE);
        out.push_str("    </style>\n</head>\n<body>\n    <h1>Broken Links Crawler Report</h1>\n");
        out.push_str(&format!(
            "    <div class=\"meta\">\n        <p><strong>Generated at:</strong> {generated_at}</p>\n        <p><strong>Execution Time:</strong> {}</p>\n        <p><strong>Target Url:</strong> {}</p>\n        <p><strong>Visited URLs:</strong> {visited_count}</p>\n        <p><strong>Broken URLs:</strong> {}</p>\n        <p><strong>Fetch Errors:</strong> {}</p>\n        <p><strong>Workers Used:</strong> {workers_num}</p>\n    </div>\n",
            encode_text(elapsed),
            hyperlink(target_url),
            broken.len(),
            fetch_errors.len(),
        ));

        link_table(&mut out, "Broken Links", broken);
        link_table(&mut out, "Fetch Errors", fetch_errors);
        out.push_str("</body>\n</html>\n");

        info!("HTML report generated");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkprobe_core::LinkStatus;

    #[test]
    fn test_urls_are_escaped_and_linked() {
        let mut broken = Task::new(
            "https://a.test/q?x=1&y=<script>",
            1,
            "https://a.test/",
        );
        broken.status = LinkStatus::NoSuchPage;

        let html = HtmlReport.generate("https://a.test/", &[broken], &[], "00:00:01.00", 2, 1);

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("no_such_page"));
        assert!(!html.contains("y=<script>"), "raw markup must not leak into the page");
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_summary_counts_present() {
        let html = HtmlReport.generate("https://a.test/", &[], &[], "00:00:00.50", 9, 3);
        assert!(html.contains("<strong>Visited URLs:</strong> 9"));
        assert!(html.contains("<strong>Workers Used:</strong> 3"));
    }
}
