//! Filename hint from the URL path.

use url::Url;

/// Last non-empty path segment of `url`, percent-decoded.
///
/// `None` when the URL does not parse or its path is the root. Query and
/// fragment are ignored.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let raw = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = super::content_disposition::percent_decode(raw);
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}
