//! Segment worker: fetch one range into its own artifact.
//!
//! The worker owns its artifact and its [`SegmentState`] counter. It checks
//! the shared cancellation token before every chunk, never writes past the
//! expected length, and never deletes its artifact (the coordinator purges
//! or assembles).

use std::io::{self, BufWriter, Write};

use crate::control::CancellationToken;
use crate::error::SegmentError;
use crate::segmenter::FetchTask;
use crate::state::{SegmentState, SegmentStatus};
use crate::storage::SegmentStore;
use crate::transport::{ChunkFlow, FetchEnd, Transport};

/// Terminal result of one worker.
#[derive(Debug)]
pub enum SegmentOutcome {
    Completed { bytes: u64 },
    Failed(SegmentError),
    /// Stopped at a chunk boundary because the session was cancelled.
    Cancelled { bytes: u64 },
}

impl SegmentOutcome {
    pub fn status(&self) -> SegmentStatus {
        match self {
            SegmentOutcome::Completed { .. } => SegmentStatus::Completed,
            SegmentOutcome::Failed(_) => SegmentStatus::Failed,
            SegmentOutcome::Cancelled { .. } => SegmentStatus::Cancelled,
        }
    }
}

/// Why the chunk sink asked the transport to stop.
enum Halt {
    Cancelled,
    Overrun(u64),
    Storage(io::Error),
}

/// Fetch `task` from `url` into the store's artifact for `task.index`.
pub fn run_segment(
    transport: &dyn Transport,
    url: &str,
    task: &FetchTask,
    store: &SegmentStore,
    state: &SegmentState,
    cancel: &CancellationToken,
) -> SegmentOutcome {
    state.set_status(SegmentStatus::Running);
    tracing::debug!(segment = task.index, range = ?task.range, "segment started");

    let outcome = fetch_into_artifact(transport, url, task, store, state, cancel);

    state.set_status(outcome.status());
    match &outcome {
        SegmentOutcome::Completed { bytes } => {
            tracing::debug!(segment = task.index, bytes, "segment completed")
        }
        SegmentOutcome::Cancelled { bytes } => {
            tracing::debug!(segment = task.index, bytes, "segment cancelled")
        }
        SegmentOutcome::Failed(e) => tracing::warn!(segment = task.index, "segment failed: {}", e),
    }
    outcome
}

fn fetch_into_artifact(
    transport: &dyn Transport,
    url: &str,
    task: &FetchTask,
    store: &SegmentStore,
    state: &SegmentState,
    cancel: &CancellationToken,
) -> SegmentOutcome {
    let mut file = match store.create_artifact(task.index) {
        Ok(f) => BufWriter::new(f),
        Err(e) => return SegmentOutcome::Failed(SegmentError::Storage(e)),
    };
    if cancel.is_cancelled() {
        return SegmentOutcome::Cancelled { bytes: 0 };
    }

    let mut written = 0u64;
    let mut halt: Option<Halt> = None;
    let fetched = transport.fetch(url, task.range.as_ref(), &mut |chunk: &[u8]| -> ChunkFlow {
        if cancel.is_cancelled() {
            halt = Some(Halt::Cancelled);
            return ChunkFlow::Stop;
        }
        let len = chunk.len() as u64;
        if let Some(expected) = task.expected_len {
            if written + len > expected {
                halt = Some(Halt::Overrun(expected));
                return ChunkFlow::Stop;
            }
        }
        if let Err(e) = file.write_all(chunk) {
            halt = Some(Halt::Storage(e));
            return ChunkFlow::Stop;
        }
        written += len;
        state.add_written(len);
        ChunkFlow::Continue
    });

    match (halt, fetched) {
        (Some(Halt::Cancelled), _) | (None, Ok(FetchEnd::Stopped)) => {
            // Partial artifact stays for the coordinator to purge.
            let _ = file.flush();
            SegmentOutcome::Cancelled { bytes: written }
        }
        (Some(Halt::Overrun(expected)), _) => {
            SegmentOutcome::Failed(SegmentError::Overrun { expected })
        }
        (Some(Halt::Storage(e)), _) => SegmentOutcome::Failed(SegmentError::Storage(e)),
        (None, Err(e)) => SegmentOutcome::Failed(SegmentError::Transport(e)),
        (None, Ok(FetchEnd::Complete)) => {
            if let Err(e) = file.flush() {
                return SegmentOutcome::Failed(SegmentError::Storage(e));
            }
            match task.expected_len {
                Some(expected) if written < expected => {
                    SegmentOutcome::Failed(SegmentError::PartialTransfer {
                        expected,
                        received: written,
                    })
                }
                _ => SegmentOutcome::Completed { bytes: written },
            }
        }
    }
}
