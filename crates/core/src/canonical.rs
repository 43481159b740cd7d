//! Canonical URL form used for task identity.
//!
//! Parsing through the `url` crate IDNA-encodes the host and
//! percent-encodes path and query (`=` and `&` survive in the query), so
//! two spellings of the same link compare equal. Fragments are kept:
//! `page#a` and `page#b` are distinct probe targets. Trailing slashes are
//! not collapsed; the seed is crawled in exactly the form the caller gave.

use url::Url;

use crate::error::CrawlError;

/// Canonicalize an absolute URL, typically the crawl seed.
pub fn canonicalize_seed(raw: &str) -> Result<String, CrawlError> {
    let parsed = Url::parse(raw).map_err(|e| CrawlError::InvalidUrl(format!("{raw}: {e}")))?;
    if !is_web_scheme(parsed.scheme()) {
        return Err(CrawlError::InvalidUrl(format!(
            "{raw}: expected an http or https URL"
        )));
    }
    Ok(parsed.to_string())
}

/// Canonicalize an href found on a page. Relative references resolve
/// against `base` (the crawl seed, so site-absolute hrefs work uniformly).
/// Returns `None` for anything that does not end up http(s): mailto:,
/// javascript:, tel:, data: and friends all drop out here.
pub fn canonicalize_href(href: &str, base: &Url) -> Option<String> {
    let resolved = base.join(href).ok()?;
    if !is_web_scheme(resolved.scheme()) {
        return None;
    }
    Some(resolved.to_string())
}

fn is_web_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}
