//! Transfer coordinator: plan, fetch concurrently, assemble or clean up.
//!
//! [`TransferCoordinator::download`] drives one session through its
//! [`TransferPhase`]s and returns exactly one terminal outcome. On any
//! failure or cancellation every temporary artifact is removed and the
//! destination is left untouched.

mod destination;
mod fetch;
mod phase;

pub use phase::TransferPhase;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{SplitgetConfig, MAX_SEGMENTS};
use crate::control::CancellationToken;
use crate::error::{DownloadError, PlanningError};
use crate::progress::ProgressSink;
use crate::segmenter::{effective_segment_count, FetchTask, TransferMode, TransferPlan};
use crate::state::SegmentState;
use crate::storage::{self, SegmentStore};
use crate::transport::{ProbeResult, RangeSupport, Transport};

use destination::{resolve_destination, session_parent};
use fetch::{fetch_all, FetchContext, FetchSummary};
use phase::PhaseTracker;

/// What to download and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// Requested concurrency, `1..=MAX_SEGMENTS`.
    pub segments: usize,
    /// Output file, or a directory to place the derived filename in.
    pub destination: Option<PathBuf>,
    /// Directory for the derived filename when `destination` is `None`.
    pub output_dir: PathBuf,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, segments: usize) -> Self {
        Self {
            url: url.into(),
            segments,
            destination: None,
            output_dir: PathBuf::from("."),
        }
    }

    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Summary of a finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub destination: PathBuf,
    pub bytes: u64,
    /// Workers used (0 for an empty resource).
    pub segments: usize,
    pub elapsed: Duration,
    pub mode: TransferMode,
}

impl DownloadReport {
    /// Average throughput in bytes per second.
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            self.bytes as f64
        }
    }
}

/// Output of the planning phase.
struct Planned {
    destination: PathBuf,
    plan: TransferPlan,
}

/// Runs download sessions over a [`Transport`].
pub struct TransferCoordinator<T> {
    transport: T,
    poll_interval: Duration,
    temp_dir: Option<PathBuf>,
}

impl<T: Transport> TransferCoordinator<T> {
    pub fn new(transport: T, config: &SplitgetConfig) -> Self {
        Self {
            transport,
            poll_interval: config.poll_interval(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Probe `url` without downloading.
    pub fn probe(&self, url: &str) -> Result<ProbeResult, PlanningError> {
        self.transport.probe(url).map_err(PlanningError::Probe)
    }

    /// Download `request` to completion, failure, or cancellation.
    ///
    /// Blocks the calling thread; `sink` is only called from it. Setting
    /// `cancel` from another thread ends the session with
    /// [`DownloadError::Cancelled`].
    pub fn download(
        &self,
        request: &DownloadRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport, DownloadError> {
        let started = Instant::now();
        let mut phase = PhaseTracker::new(&request.url);

        let planned = match self.plan(request, cancel) {
            Ok(p) => p,
            Err(e) => {
                phase.advance(TransferPhase::Failed);
                tracing::warn!(url = %request.url, "download failed: {}", e);
                return Err(e);
            }
        };
        let Planned { destination, plan } = planned;

        if plan.total_size == Some(0) {
            storage::write_empty(&destination).map_err(|e| {
                phase.advance(TransferPhase::Failed);
                DownloadError::Assembly(e)
            })?;
            phase.advance(TransferPhase::Done);
            tracing::info!(dest = %destination.display(), "empty resource, wrote empty file");
            sink.close();
            return Ok(DownloadReport {
                destination,
                bytes: 0,
                segments: 0,
                elapsed: started.elapsed(),
                mode: plan.mode,
            });
        }

        let parent = session_parent(self.temp_dir.as_deref(), &destination);
        let store = SegmentStore::create_in(&parent).map_err(|source| {
            phase.advance(TransferPhase::Failed);
            DownloadError::Planning(PlanningError::SessionDir {
                path: parent.clone(),
                source,
            })
        })?;

        phase.advance(TransferPhase::Fetching);
        let session = TransferSession::new(plan, destination, store, cancel);
        sink.begin(&session.plan);
        let ctx = FetchContext {
            transport: &self.transport,
            url: &request.url,
            store: &session.store,
            cancel: session.cancel,
            poll_interval: self.poll_interval,
        };
        let summary = fetch_all(&ctx, &session.tasks, &session.states, sink);

        let failure = match summary {
            FetchSummary::Completed => None,
            FetchSummary::Failed { index, error } => Some(DownloadError::Segment {
                index,
                source: error,
            }),
            FetchSummary::Cancelled => Some(DownloadError::Cancelled),
        };
        if let Some(err) = failure {
            phase.advance(TransferPhase::Cancelling);
            session.discard();
            phase.advance(TransferPhase::Failed);
            sink.close();
            tracing::warn!(url = %request.url, "download failed: {}", err);
            return Err(err);
        }

        let TransferSession {
            plan,
            destination,
            store,
            ..
        } = session;
        phase.advance(TransferPhase::Assembling);
        let assembled = store.assemble(&plan, &destination);
        sink.close();
        let bytes = match assembled {
            Ok(bytes) => bytes,
            Err(e) => {
                phase.advance(TransferPhase::Failed);
                tracing::warn!(dest = %destination.display(), "assembly failed: {}", e);
                return Err(e.into());
            }
        };
        phase.advance(TransferPhase::Done);

        let report = DownloadReport {
            destination,
            bytes,
            segments: plan.segment_count(),
            elapsed: started.elapsed(),
            mode: plan.mode,
        };
        tracing::info!(
            dest = %report.destination.display(),
            bytes = report.bytes,
            segments = report.segments,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "download complete"
        );
        Ok(report)
    }

    /// Validate, probe, pick the destination, and plan. No network I/O
    /// happens when the concurrency is out of range.
    fn plan(
        &self,
        request: &DownloadRequest,
        cancel: &CancellationToken,
    ) -> Result<Planned, DownloadError> {
        if request.segments == 0 || request.segments > MAX_SEGMENTS {
            return Err(PlanningError::InvalidConcurrency {
                requested: request.segments,
                max: MAX_SEGMENTS,
            }
            .into());
        }
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let probe = self.probe(&request.url)?;
        tracing::debug!(
            url = %request.url,
            size = ?probe.size,
            ranges = ?probe.range_support,
            "probe result"
        );
        let destination = resolve_destination(request, &probe);
        storage::check_destination(&destination).map_err(|source| {
            PlanningError::Destination {
                path: destination.clone(),
                source,
            }
        })?;
        let plan = plan_transfer(request.segments, &probe)?;
        tracing::debug!(
            dest = %destination.display(),
            segments = plan.segment_count(),
            segmented = plan.is_segmented(),
            "transfer planned"
        );
        Ok(Planned { destination, plan })
    }
}

/// Segmented when the size is known, ranges are not refused, and more than
/// one segment is worth using; otherwise one unranged stream.
fn plan_transfer(requested: usize, probe: &ProbeResult) -> Result<TransferPlan, PlanningError> {
    let total = match probe.size {
        Some(total) if probe.range_support != RangeSupport::Refused => total,
        size => return Ok(TransferPlan::stream(size)),
    };
    if total == 0 {
        return Ok(TransferPlan::stream(Some(0)));
    }
    let count = effective_segment_count(requested, Some(total));
    if count == 1 {
        return Ok(TransferPlan::stream(Some(total)));
    }
    Ok(TransferPlan::segmented(total, count)?)
}

/// What one download owns between planning and its terminal phase.
struct TransferSession<'a> {
    plan: TransferPlan,
    tasks: Vec<FetchTask>,
    /// Indexed like `tasks`; each entry is mutated only by its worker.
    states: Vec<SegmentState>,
    cancel: &'a CancellationToken,
    destination: PathBuf,
    store: SegmentStore,
}

impl<'a> TransferSession<'a> {
    fn new(
        plan: TransferPlan,
        destination: PathBuf,
        store: SegmentStore,
        cancel: &'a CancellationToken,
    ) -> Self {
        let tasks = plan.tasks();
        let states = tasks.iter().map(SegmentState::new).collect();
        Self {
            plan,
            tasks,
            states,
            cancel,
            destination,
            store,
        }
    }

    /// Remove every artifact and the session directory.
    fn discard(self) {
        let dir = self.store.path().to_path_buf();
        if let Err(e) = self.store.purge() {
            tracing::warn!(dir = %dir.display(), "failed to purge session directory: {}", e);
        }
    }
}
