//! Error taxonomy of a download session.
//!
//! Exactly one terminal [`DownloadError`] reaches the caller; per-segment
//! failures are never recovered locally.

use std::io;
use std::path::PathBuf;

use crate::segmenter::InvalidPlanError;
use crate::transport::TransportError;

/// Failure before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    #[error("invalid concurrency {requested}: must be between 1 and {max}")]
    InvalidConcurrency { requested: usize, max: usize },
    #[error("probe failed: {0}")]
    Probe(#[source] TransportError),
    #[error(transparent)]
    InvalidPlan(#[from] InvalidPlanError),
    #[error("destination {} is not writable: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create session directory in {}: {source}", .path.display())]
    SessionDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single segment worker failed.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Writing the segment artifact failed (disk full, permissions).
    #[error("storage: {0}")]
    Storage(#[from] io::Error),
    /// The body ended before the expected length was reached.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// The server sent more bytes than the range covers.
    #[error("server sent more than the {expected} bytes requested")]
    Overrun { expected: u64 },
    /// The worker thread died (panicked) without reporting an outcome.
    #[error("worker exited without reporting an outcome")]
    WorkerLost,
}

impl SegmentError {
    /// Short label: where the segment went wrong.
    pub fn kind(&self) -> &'static str {
        match self {
            SegmentError::Transport(_) | SegmentError::PartialTransfer { .. } => "transport",
            SegmentError::Storage(_) => "storage",
            SegmentError::Overrun { .. } => "protocol",
            SegmentError::WorkerLost => "worker",
        }
    }
}

/// Failure while concatenating artifacts into the destination.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("segment {index} artifact unreadable: {source}")]
    MissingArtifact {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("segment {index} artifact holds {actual} bytes, expected {expected}")]
    ShortArtifact {
        index: usize,
        expected: u64,
        actual: u64,
    },
    #[error("destination {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Terminal outcome of a failed download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Planning(#[from] PlanningError),
    #[error("segment {index} failed: {source}")]
    Segment {
        index: usize,
        #[source]
        source: SegmentError,
    },
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Short label for logs and exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::Planning(_) => "planning",
            DownloadError::Segment { source, .. } => source.kind(),
            DownloadError::Assembly(_) => "assembly",
            DownloadError::Cancelled => "cancelled",
        }
    }
}
