//! In-memory transport for engine tests: serves a fixed body, with per-range
//! delays and injected failures keyed by range start offset.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{ChunkFlow, FetchEnd, ProbeResult, RangeSupport, Transport, TransportError};
use crate::segmenter::Segment;

pub(crate) struct ScriptedTransport {
    body: Vec<u8>,
    report_length: bool,
    range_support: RangeSupport,
    filename: Option<String>,
    probe_fails: bool,
    chunk_size: usize,
    chunk_pause: Duration,
    delays: Vec<(u64, Duration)>,
    failures: Vec<(u64, usize)>,
    probes: AtomicUsize,
    fetches: AtomicUsize,
    finished: Mutex<Vec<u64>>,
}

impl ScriptedTransport {
    pub(crate) fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            report_length: true,
            range_support: RangeSupport::Bytes,
            filename: None,
            probe_fails: false,
            chunk_size: 16,
            chunk_pause: Duration::ZERO,
            delays: Vec::new(),
            failures: Vec::new(),
            probes: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn without_length(mut self) -> Self {
        self.report_length = false;
        self
    }

    pub(crate) fn range_support(mut self, support: RangeSupport) -> Self {
        self.range_support = support;
        self
    }

    pub(crate) fn filename(mut self, name: &str) -> Self {
        self.filename = Some(name.to_string());
        self
    }

    pub(crate) fn failing_probe(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    pub(crate) fn chunks(mut self, size: usize, pause: Duration) -> Self {
        self.chunk_size = size;
        self.chunk_pause = pause;
        self
    }

    /// Sleep before the first chunk of the range starting at `start`.
    pub(crate) fn delay_range(mut self, start: u64, delay: Duration) -> Self {
        self.delays.push((start, delay));
        self
    }

    /// The range starting at `start` errors out after `after_chunks` chunks.
    pub(crate) fn fail_range(mut self, start: u64, after_chunks: usize) -> Self {
        self.failures.push((start, after_chunks));
        self
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Range starts in the order their fetches ran to completion.
    pub(crate) fn finish_order(&self) -> Vec<u64> {
        self.finished.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn probe(&self, _url: &str) -> Result<ProbeResult, TransportError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.probe_fails {
            // CURLE_COULDNT_RESOLVE_HOST
            return Err(TransportError::Curl(curl::Error::new(6)));
        }
        Ok(ProbeResult {
            size: self.report_length.then_some(self.body.len() as u64),
            suggested_filename: self.filename.clone(),
            range_support: self.range_support,
            effective_url: None,
        })
    }

    fn fetch(
        &self,
        _url: &str,
        range: Option<&Segment>,
        sink: &mut dyn FnMut(&[u8]) -> ChunkFlow,
    ) -> Result<FetchEnd, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let start = range.map(|s| s.start).unwrap_or(0);
        let slice = match range {
            Some(s) => &self.body[s.start as usize..=s.end as usize],
            None => &self.body[..],
        };

        if let Some((_, delay)) = self.delays.iter().find(|(s, _)| *s == start) {
            std::thread::sleep(*delay);
        }
        let fail_after = self
            .failures
            .iter()
            .find(|(s, _)| *s == start)
            .map(|(_, n)| *n);

        for (i, chunk) in slice.chunks(self.chunk_size.max(1)).enumerate() {
            if fail_after == Some(i) {
                // CURLE_RECV_ERROR
                return Err(TransportError::Curl(curl::Error::new(56)));
            }
            if sink(chunk) == ChunkFlow::Stop {
                return Ok(FetchEnd::Stopped);
            }
            if !self.chunk_pause.is_zero() {
                std::thread::sleep(self.chunk_pause);
            }
        }
        self.finished.lock().unwrap().push(start);
        Ok(FetchEnd::Complete)
    }
}
