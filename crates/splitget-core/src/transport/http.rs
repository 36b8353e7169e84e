//! libcurl-backed transport (blocking; one `Easy` handle per request).

use std::cell::RefCell;
use std::time::Duration;

use curl::easy::Easy;

use super::parse::{parse_head, parse_http_status, push_header_line};
use super::{check_response, ChunkFlow, FetchEnd, ProbeResult, Transport, TransportError};
use crate::config::SplitgetConfig;
use crate::segmenter::Segment;

/// Per-handle libcurl settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard wall-clock limit for one request.
    pub timeout: Duration,
    pub max_redirections: u32,
    /// Receive buffer size (None = libcurl default).
    pub buffer_size: Option<usize>,
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
            max_redirections: 10,
            buffer_size: None,
            user_agent: None,
        }
    }
}

impl CurlOptions {
    pub fn from_config(cfg: &SplitgetConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
            buffer_size: cfg.buffer_size,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// Blocking HTTP transport; safe to share across worker threads since every
/// request builds its own handle.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: CurlOptions,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }

    pub fn from_config(cfg: &SplitgetConfig) -> Self {
        Self::new(CurlOptions::from_config(cfg))
    }

    fn easy(&self, url: &str) -> Result<Easy, curl::Error> {
        let opts = &self.options;
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(opts.max_redirections)?;
        easy.connect_timeout(opts.connect_timeout)?;
        easy.low_speed_limit(opts.low_speed_limit)?;
        easy.low_speed_time(opts.low_speed_time)?;
        easy.timeout(opts.timeout)?;
        if let Some(size) = opts.buffer_size {
            easy.buffer_size(size)?;
        }
        let agent = opts
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("splitget/{}", env!("CARGO_PKG_VERSION")));
        easy.useragent(&agent)?;
        Ok(easy)
    }
}

impl Transport for CurlTransport {
    fn probe(&self, url: &str) -> Result<ProbeResult, TransportError> {
        let mut lines: Vec<String> = Vec::new();
        let mut easy = self.easy(url)?;
        easy.nobody(true)?;
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                push_header_line(&mut lines, data);
                true
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        let effective_url = easy.effective_url()?.map(str::to_string);
        if !(200..300).contains(&code) {
            tracing::debug!(url, code, "HEAD not usable, body will be streamed");
            return Ok(ProbeResult {
                effective_url,
                ..ProbeResult::unknown()
            });
        }

        let head = parse_head(&lines);
        Ok(ProbeResult {
            size: head.content_length,
            suggested_filename: head.suggested_filename,
            range_support: head.range_support,
            effective_url,
        })
    }

    fn fetch(
        &self,
        url: &str,
        range: Option<&Segment>,
        sink: &mut dyn FnMut(&[u8]) -> ChunkFlow,
    ) -> Result<FetchEnd, TransportError> {
        let mut easy = self.easy(url)?;
        if let Some(segment) = range {
            easy.range(&segment.curl_range())?;
        }

        let lines = RefCell::new(Vec::<String>::new());
        let mut verdict: Option<Result<(), TransportError>> = None;
        let mut stopped = false;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                push_header_line(&mut lines.borrow_mut(), data);
                true
            })?;
            transfer.write_function(|data| {
                let ok = verdict
                    .get_or_insert_with(|| check_response(&lines.borrow(), range))
                    .is_ok();
                if !ok {
                    return Ok(0);
                }
                match sink(data) {
                    ChunkFlow::Continue => Ok(data.len()),
                    ChunkFlow::Stop => {
                        stopped = true;
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if e.is_write_error() {
                if stopped {
                    return Ok(FetchEnd::Stopped);
                }
                if let Some(Err(rejected)) = verdict {
                    return Err(rejected);
                }
            }
            return Err(TransportError::Curl(e));
        }

        // Empty bodies never reach the write callback; judge the status here.
        if verdict.is_none() {
            let mut lines = lines.into_inner();
            if parse_http_status(&lines).is_none() {
                lines.insert(0, format!("HTTP/1.1 {}", easy.response_code()?));
            }
            check_response(&lines, range)?;
        }
        Ok(FetchEnd::Complete)
    }
}
