//! Progress aggregation and the sink interface used for rendering.
//!
//! The aggregator never receives pushes from workers: it sums their counters
//! when asked. The coordinator calls [`ProgressAggregator::publish`] on its
//! poll cadence, so the sink sees one update per segment per tick instead of
//! one per chunk.

use crate::segmenter::TransferPlan;
use crate::state::SegmentState;

/// Receiver of progress updates (progress bars, logs, tests).
pub trait ProgressSink {
    /// Called once the plan is known, before any worker starts.
    fn begin(&self, _plan: &TransferPlan) {}
    /// `delta` bytes were written by segment `index` since the last update.
    fn update_segment(&self, index: usize, delta: u64);
    /// Aggregate bytes written so far.
    fn update_total(&self, total: u64);
    fn close_segment(&self, _index: usize) {}
    fn close(&self) {}
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update_segment(&self, _index: usize, _delta: u64) {}
    fn update_total(&self, _total: u64) {}
}

/// Read-only view over the session's segment counters.
pub struct ProgressAggregator<'a> {
    states: &'a [SegmentState],
    published: Vec<u64>,
    last_total: Option<u64>,
}

impl<'a> ProgressAggregator<'a> {
    pub fn new(states: &'a [SegmentState]) -> Self {
        Self {
            states,
            published: vec![0; states.len()],
            last_total: None,
        }
    }

    /// Sum of all bytes written at the moment of the call.
    pub fn total_written(&self) -> u64 {
        self.states.iter().map(SegmentState::bytes_written).sum()
    }

    /// Push per-segment deltas and the total to `sink`; returns the total.
    pub fn publish(&mut self, sink: &dyn ProgressSink) -> u64 {
        let mut total = 0u64;
        for (state, seen) in self.states.iter().zip(self.published.iter_mut()) {
            let now = state.bytes_written();
            if now > *seen {
                sink.update_segment(state.index(), now - *seen);
                *seen = now;
            }
            total += now;
        }
        if self.last_total != Some(total) {
            sink.update_total(total);
            self.last_total = Some(total);
        }
        total
    }
}
