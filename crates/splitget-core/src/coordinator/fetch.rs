//! Fetching phase: one scoped thread per segment, results over a channel,
//! progress published between results.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::control::CancellationToken;
use crate::error::SegmentError;
use crate::progress::{ProgressAggregator, ProgressSink};
use crate::segmenter::FetchTask;
use crate::state::{SegmentState, SegmentStatus};
use crate::storage::SegmentStore;
use crate::transport::Transport;
use crate::worker::{run_segment, SegmentOutcome};

/// How the fetching phase ended.
#[derive(Debug)]
pub(crate) enum FetchSummary {
    /// Every segment completed.
    Completed,
    /// The first segment to fail (the token has been set).
    Failed { index: usize, error: SegmentError },
    /// Stopped by an external cancel with no segment failure.
    Cancelled,
}

pub(crate) struct FetchContext<'a> {
    pub(crate) transport: &'a dyn Transport,
    pub(crate) url: &'a str,
    pub(crate) store: &'a SegmentStore,
    pub(crate) cancel: &'a CancellationToken,
    pub(crate) poll_interval: Duration,
}

/// Run every task to a terminal outcome. Returns only after all workers
/// have exited.
pub(crate) fn fetch_all(
    ctx: &FetchContext<'_>,
    tasks: &[FetchTask],
    states: &[SegmentState],
    sink: &dyn ProgressSink,
) -> FetchSummary {
    let mut aggregator = ProgressAggregator::new(states);
    let mut failure: Option<(usize, SegmentError)> = None;
    let mut cancelled = false;

    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<(usize, SegmentOutcome)>();
        for (task, state) in tasks.iter().zip(states) {
            let tx = tx.clone();
            scope.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_segment(ctx.transport, ctx.url, task, ctx.store, state, ctx.cancel)
                }))
                .unwrap_or_else(|_| {
                    state.set_status(SegmentStatus::Failed);
                    SegmentOutcome::Failed(SegmentError::WorkerLost)
                });
                let _ = tx.send((task.index, outcome));
            });
        }
        drop(tx);

        let mut remaining = tasks.len();
        while remaining > 0 {
            match rx.recv_timeout(ctx.poll_interval) {
                Ok((index, outcome)) => {
                    remaining -= 1;
                    aggregator.publish(sink);
                    sink.close_segment(index);
                    match outcome {
                        SegmentOutcome::Completed { .. } => {}
                        SegmentOutcome::Cancelled { .. } => cancelled = true,
                        SegmentOutcome::Failed(error) => {
                            if failure.is_none() {
                                tracing::warn!(segment = index, "cancelling session: {}", error);
                                ctx.cancel.cancel();
                                failure = Some((index, error));
                            }
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    aggregator.publish(sink);
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });
    aggregator.publish(sink);

    match failure {
        Some((index, error)) => FetchSummary::Failed { index, error },
        None if cancelled => FetchSummary::Cancelled,
        None => FetchSummary::Completed,
    }
}
