//! Per-segment state: written by exactly one worker, read by the aggregator.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::segmenter::FetchTask;

/// Lifecycle of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SegmentStatus {
    Pending = 0,
    Running = 1,
    Completed = 2,
    Failed = 3,
    Cancelled = 4,
}

impl SegmentStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SegmentStatus::Pending,
            1 => SegmentStatus::Running,
            2 => SegmentStatus::Completed,
            3 => SegmentStatus::Failed,
            _ => SegmentStatus::Cancelled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SegmentStatus::Completed | SegmentStatus::Failed | SegmentStatus::Cancelled
        )
    }
}

/// Counter and status of one segment. Only the owning worker mutates it.
#[derive(Debug)]
pub struct SegmentState {
    index: usize,
    written: AtomicU64,
    status: AtomicU8,
}

impl SegmentState {
    pub fn new(task: &FetchTask) -> Self {
        Self {
            index: task.index,
            written: AtomicU64::new(0),
            status: AtomicU8::new(SegmentStatus::Pending as u8),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bytes_written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    pub fn status(&self) -> SegmentStatus {
        SegmentStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn add_written(&self, n: u64) {
        self.written.fetch_add(n, Ordering::AcqRel);
    }

    pub(crate) fn set_status(&self, status: SegmentStatus) {
        self.status.store(status as u8, Ordering::Release);
    }
}
