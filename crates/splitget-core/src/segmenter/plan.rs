//! Transfer plan: segmented ranges or a single unranged stream.

use super::range::{plan_segments, InvalidPlanError, Segment};

/// How the body is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferMode {
    /// One ranged GET per segment, reassembled by index.
    Segmented(Vec<Segment>),
    /// A single GET without a Range header (size unknown or ranges refused).
    Stream,
}

/// Computed once per session from the probed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Total size in bytes; `None` when the server did not report a length.
    pub total_size: Option<u64>,
    pub mode: TransferMode,
}

/// One unit of work handed to a segment worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTask {
    pub index: usize,
    /// `None` for the unranged stream.
    pub range: Option<Segment>,
    /// Bytes the worker must receive, when known.
    pub expected_len: Option<u64>,
}

impl TransferPlan {
    pub fn segmented(total_size: u64, segment_count: usize) -> Result<Self, InvalidPlanError> {
        let segments = plan_segments(total_size, segment_count)?;
        Ok(TransferPlan {
            total_size: Some(total_size),
            mode: TransferMode::Segmented(segments),
        })
    }

    pub fn stream(total_size: Option<u64>) -> Self {
        TransferPlan {
            total_size,
            mode: TransferMode::Stream,
        }
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self.mode, TransferMode::Segmented(_))
    }

    pub fn segment_count(&self) -> usize {
        match &self.mode {
            TransferMode::Segmented(segments) => segments.len(),
            TransferMode::Stream => 1,
        }
    }

    /// Work items in index order.
    pub fn tasks(&self) -> Vec<FetchTask> {
        match &self.mode {
            TransferMode::Segmented(segments) => segments
                .iter()
                .map(|s| FetchTask {
                    index: s.index,
                    range: Some(*s),
                    expected_len: Some(s.len()),
                })
                .collect(),
            TransferMode::Stream => vec![FetchTask {
                index: 0,
                range: None,
                expected_len: self.total_size,
            }],
        }
    }
}

/// Number of segments actually used for a request of `requested`.
///
/// Clamped to the byte count when the size is known so that no segment is
/// empty; an unknown size always means a single segment.
pub fn effective_segment_count(requested: usize, total_size: Option<u64>) -> usize {
    match total_size {
        Some(total) if total > 0 => (requested as u64).min(total).max(1) as usize,
        _ => 1,
    }
}
