pub mod html;

use tracing::debug;
use url::Url;

use linkprobe_core::Task;

/// Max bytes to parse (5 MB). Larger pages are truncated before parsing.
const MAX_PARSE_SIZE: usize = 5 * 1024 * 1024;

/// Decode a response body: UTF-8 when valid, otherwise ISO-8859-1
/// (WINDOWS_1252 is the WHATWG mapping of that label) so legacy pages
/// still parse instead of erroring out.
pub fn decode_body(body: &[u8]) -> String {
    let body = if body.len() > MAX_PARSE_SIZE {
        debug!(len = body.len(), "body exceeds parse cap, truncating");
        &body[..MAX_PARSE_SIZE]
    } else {
        body
    };
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(body);
            text.into_owned()
        }
    }
}

/// Decode a fetched page and extract its child tasks.
pub fn parse_page(body: &[u8], current: &Task, target_url: &Url, max_depth: u32) -> Vec<Task> {
    let text = decode_body(body);
    let children = html::extract_links(&text, current, target_url, max_depth);
    debug!(url = %current.url, found = children.len(), "finished parsing");
    children
}
