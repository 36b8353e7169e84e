//! Segmented HTTP download engine.
//!
//! A download is probed, split into byte ranges, fetched by one worker per
//! range into isolated artifacts, and reassembled in index order. Any failure
//! cancels the remaining workers and removes every temporary file.

pub mod config;
pub mod logging;

pub mod control;
pub mod coordinator;
pub mod error;
pub mod progress;
pub mod segmenter;
pub mod state;
pub mod storage;
pub mod transport;
pub mod url_model;
pub mod worker;

pub use config::{SplitgetConfig, MAX_SEGMENTS};
pub use control::CancellationToken;
pub use coordinator::{DownloadReport, DownloadRequest, TransferCoordinator, TransferPhase};
pub use error::{AssemblyError, DownloadError, PlanningError, SegmentError};
pub use progress::{NoProgress, ProgressSink};
pub use segmenter::{TransferMode, TransferPlan};
pub use transport::{CurlTransport, ProbeResult, RangeSupport, Transport};
