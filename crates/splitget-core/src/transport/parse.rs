//! Response header parsing: status line, lengths, ranges, filename hint.

use crate::url_model::parse_content_disposition_filename;

/// What the server said about byte-range requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeSupport {
    /// `Accept-Ranges: bytes`.
    Bytes,
    /// `Accept-Ranges: none`; segmenting would fail, so the body is streamed.
    Refused,
    /// Header absent. Ranges are attempted; many servers honor them silently.
    #[default]
    Unknown,
}

/// Header fields of a probe response that the planner cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HeadInfo {
    pub content_length: Option<u64>,
    pub range_support: RangeSupport,
    pub suggested_filename: Option<String>,
}

/// Collects header lines of the final response only: a new status line
/// (redirect hop, `100 Continue`) discards what came before it.
pub(crate) fn push_header_line(lines: &mut Vec<String>, data: &[u8]) {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let line = s.trim_end();
    if line.starts_with("HTTP/") {
        lines.clear();
    }
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}

fn header_value<'a>(lines: &'a [String], wanted: &str) -> Option<&'a str> {
    lines.iter().rev().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(wanted)
            .then_some(value.trim())
    })
}

pub(crate) fn parse_head(lines: &[String]) -> HeadInfo {
    let content_length = header_value(lines, "content-length").and_then(|v| v.parse::<u64>().ok());
    let range_support = match header_value(lines, "accept-ranges") {
        Some(v) if v.eq_ignore_ascii_case("bytes") => RangeSupport::Bytes,
        Some(v) if v.eq_ignore_ascii_case("none") => RangeSupport::Refused,
        _ => RangeSupport::Unknown,
    };
    let suggested_filename =
        header_value(lines, "content-disposition").and_then(parse_content_disposition_filename);
    HeadInfo {
        content_length,
        range_support,
        suggested_filename,
    }
}

/// Status code from the `HTTP/x.y NNN reason` line, if one was seen.
pub fn parse_http_status(lines: &[String]) -> Option<u32> {
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("HTTP/"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
}

/// Inclusive `(start, end)` from `Content-Range: bytes start-end/total`.
pub fn parse_content_range(lines: &[String]) -> Option<(u64, u64)> {
    let value = header_value(lines, "content-range")?;
    let spec = value.strip_prefix("bytes")?.trim_start();
    let (range, _total) = spec.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}
