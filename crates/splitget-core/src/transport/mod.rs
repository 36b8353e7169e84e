//! HTTP transport seam: metadata probe and (ranged) streaming GET.
//!
//! The engine only talks to [`Transport`]; [`CurlTransport`] is the libcurl
//! implementation used by the CLI. Bodies are pushed chunk by chunk into a
//! caller-supplied sink, which can end the transfer early.

mod http;
mod parse;
#[cfg(test)]
pub(crate) mod scripted;

pub use http::{CurlOptions, CurlTransport};
pub use parse::{parse_content_range, parse_http_status, RangeSupport};

use crate::segmenter::Segment;

/// Metadata learned from the probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// `Content-Length` of the resource, if the server reported one.
    pub size: Option<u64>,
    /// Filename from `Content-Disposition`, unsanitized.
    pub suggested_filename: Option<String>,
    pub range_support: RangeSupport,
    /// URL after redirects, when the transport knows it.
    pub effective_url: Option<String>,
}

impl ProbeResult {
    /// Probe outcome when the metadata request gave nothing usable; the
    /// caller falls back to streaming the body.
    pub fn unknown() -> Self {
        ProbeResult {
            size: None,
            suggested_filename: None,
            range_support: RangeSupport::Unknown,
            effective_url: None,
        }
    }
}

/// Returned by a chunk sink to continue or end the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFlow {
    Continue,
    Stop,
}

/// How a fetch ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEnd {
    /// The body was consumed to the end.
    Complete,
    /// The sink returned [`ChunkFlow::Stop`].
    Stopped,
}

/// Transport-level failure of a probe or fetch.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported an error (DNS, connect, timeout, reset, bad URL).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// A ranged request was answered with something other than 206.
    #[error("expected 206 Partial Content for ranged request, got HTTP {0}")]
    InvalidRangeResponse(u32),
    /// 206 answered, but `Content-Range` does not cover the requested bytes.
    #[error("Content-Range mismatch: requested {requested}, got {received}")]
    RangeMismatch { requested: String, received: String },
}

/// Capability to probe a URL and stream its body.
pub trait Transport: Send + Sync {
    /// Metadata request (HEAD). A non-2xx answer is not an error: it yields
    /// [`ProbeResult::unknown`] so the download degrades to a single stream.
    fn probe(&self, url: &str) -> Result<ProbeResult, TransportError>;

    /// GET `url`, restricted to `range` when given, handing every received
    /// chunk to `sink` in order. No bytes are handed over when the response
    /// is not an acceptable answer to the request.
    fn fetch(
        &self,
        url: &str,
        range: Option<&Segment>,
        sink: &mut dyn FnMut(&[u8]) -> ChunkFlow,
    ) -> Result<FetchEnd, TransportError>;
}

/// Checks the final response status (and `Content-Range` for ranged requests)
/// from the collected header lines.
pub(crate) fn check_response(lines: &[String], range: Option<&Segment>) -> Result<(), TransportError> {
    let code = parse_http_status(lines).unwrap_or(0);
    if !(200..300).contains(&code) {
        return Err(TransportError::Http(code));
    }
    let Some(segment) = range else {
        return Ok(());
    };
    if code != 206 {
        return Err(TransportError::InvalidRangeResponse(code));
    }
    match parse_content_range(lines) {
        Some((start, end)) if start == segment.start && end == segment.end => Ok(()),
        other => Err(TransportError::RangeMismatch {
            requested: segment.curl_range(),
            received: other
                .map(|(s, e)| format!("{}-{}", s, e))
                .unwrap_or_else(|| "none".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn check_response_accepts_matching_206() {
        let seg = Segment { index: 1, start: 250, end: 499 };
        let h = lines(&["HTTP/1.1 206 Partial Content", "Content-Range: bytes 250-499/1000"]);
        assert!(check_response(&h, Some(&seg)).is_ok());
    }

    #[test]
    fn check_response_rejects_200_for_range() {
        let seg = Segment { index: 0, start: 0, end: 99 };
        let h = lines(&["HTTP/1.1 200 OK", "Content-Length: 1000"]);
        assert!(matches!(
            check_response(&h, Some(&seg)),
            Err(TransportError::InvalidRangeResponse(200))
        ));
    }

    #[test]
    fn check_response_rejects_wrong_content_range() {
        let seg = Segment { index: 0, start: 0, end: 99 };
        let h = lines(&["HTTP/1.1 206 Partial Content", "Content-Range: bytes 0-49/1000"]);
        match check_response(&h, Some(&seg)) {
            Err(TransportError::RangeMismatch { requested, received }) => {
                assert_eq!(requested, "0-99");
                assert_eq!(received, "0-49");
            }
            other => panic!("expected RangeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn check_response_plain_get() {
        assert!(check_response(&lines(&["HTTP/1.1 200 OK"]), None).is_ok());
        assert!(matches!(
            check_response(&lines(&["HTTP/1.1 404 Not Found"]), None),
            Err(TransportError::Http(404))
        ));
    }
}
