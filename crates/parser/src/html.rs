//! Anchor extraction and child-task classification.

use scraper::{Html, Selector};
use url::Url;

use linkprobe_core::canonical::canonicalize_href;
use linkprobe_core::Task;

/// Pull every `<a href>` out of a page and classify it.
///
/// Hrefs resolve against the crawl target (not the current page), so
/// site-absolute and relative links land in the same canonical space.
/// On-site links descend one level; same-page fragments and off-site
/// links are emitted at the depth limit so they get probed for
/// reachability but never expand the frontier.
pub fn extract_links(html: &str, current: &Task, target_url: &Url, max_depth: u32) -> Vec<Task> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let target = target_url.as_str();
    let same_page_prefix = format!("{}#", current.url);
    let mut found = Vec::new();

    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = canonicalize_href(href, target_url) else {
            continue;
        };

        if url.starts_with(&same_page_prefix) {
            // Same page, different fragment: probe it, don't descend.
            found.push(Task::new(url, max_depth, current.url.clone()));
        } else if url.starts_with(target) {
            found.push(Task::new(url, current.depth.saturating_add(1), current.url.clone()));
        } else {
            // Off-site: checked for reachability, never crawled into.
            found.push(Task::new(url, max_depth, current.url.clone()));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Url {
        Url::parse("https://example.test/").unwrap()
    }

    fn page_task(url: &str, depth: u32) -> Task {
        Task::new(url, depth, Task::SEED_ORIGIN)
    }

    #[test]
    fn test_on_site_links_descend_one_level() {
        let current = page_task("https://example.test/", 1);
        let html = r#"<a href="/docs">docs</a>"#;
        let tasks = extract_links(html, &current, &target(), 5);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].url, "https://example.test/docs");
        assert_eq!(tasks[0].depth, 2);
        assert_eq!(tasks[0].first_found_on, "https://example.test/");
    }

    #[test]
    fn test_off_site_links_are_pinned_to_max_depth() {
        let current = page_task("https://example.test/", 0);
        let html = r#"<a href="https://other.test/page">x</a>"#;
        let tasks = extract_links(html, &current, &target(), 5);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].url, "https://other.test/page");
        assert_eq!(tasks[0].depth, 5);
    }

    #[test]
    fn test_same_page_fragment_is_pinned_to_max_depth() {
        let current = page_task("https://example.test/", 0);
        let html = r##"<a href="#section">jump</a>"##;
        let tasks = extract_links(html, &current, &target(), 5);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].url, "https://example.test/#section");
        assert_eq!(tasks[0].depth, 5);
    }

    #[test]
    fn test_non_web_schemes_are_dropped() {
        let current = page_task("https://example.test/", 0);
        let html = r#"
            <a href="mailto:a@example.test">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="tel:+1555">tel</a>
            <a href="/real">real</a>
        "#;
        let tasks = extract_links(html, &current, &target(), 5);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].url, "https://example.test/real");
    }

    #[test]
    fn test_anchors_without_href_are_ignored() {
        let current = page_task("https://example.test/", 0);
        let tasks = extract_links("<a name=\"top\">top</a>", &current, &target(), 5);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_duplicate_hrefs_are_all_emitted() {
        // Dedup is the queue's job, not the extractor's.
        let current = page_task("https://example.test/", 0);
        let html = r#"<a href="/p">one</a><a href="/p">two</a>"#;
        let tasks = extract_links(html, &current, &target(), 5);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0], tasks[1]);
    }

    #[test]
    fn test_relative_hrefs_resolve_against_target() {
        let current = page_task("https://example.test/deep/page", 2);
        let html = r#"<a href="sibling">s</a>"#;
        let tasks = extract_links(html, &current, &target(), 5);

        // Resolution is against the target root, not the current page.
        assert_eq!(tasks[0].url, "https://example.test/sibling");
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let current = page_task("https://example.test/", 0);
        let html = r#"<p><a href="/a">unclosed<div><a href="/b">"#;
        let tasks = extract_links(html, &current, &target(), 5);
        assert_eq!(tasks.len(), 2);
    }
}
