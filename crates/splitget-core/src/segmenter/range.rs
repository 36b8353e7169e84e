//! Segment type and range planning.

/// One planned byte range `[start, end]` (inclusive on both ends).
///
/// `index` is the reassembly position: artifacts are concatenated in
/// ascending index order no matter which worker finishes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl Segment {
    /// Number of bytes covered: `end - start + 1`.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Range in the form libcurl's `CURLOPT_RANGE` expects (`start-end`, no unit).
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Rejected planner input: a zero-size resource or zero segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPlanError {
    #[error("segment count must be at least 1")]
    NoSegments,
    #[error("cannot segment an empty resource")]
    EmptyResource,
}

/// Builds a segment plan for `total_size` bytes split `segment_count` ways.
///
/// Every segment but the last is `total_size / segment_count` bytes long; the
/// last one runs to `total_size - 1` and so absorbs the remainder. A count
/// larger than `total_size` is clamped so that no range is empty.
pub fn plan_segments(total_size: u64, segment_count: usize) -> Result<Vec<Segment>, InvalidPlanError> {
    if segment_count == 0 {
        return Err(InvalidPlanError::NoSegments);
    }
    if total_size == 0 {
        return Err(InvalidPlanError::EmptyResource);
    }

    let count = (segment_count as u64).min(total_size);
    let base = total_size / count;

    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let start = i * base;
        let end = if i == count - 1 {
            total_size - 1
        } else {
            start + base - 1
        };
        out.push(Segment {
            index: i as usize,
            start,
            end,
        });
    }

    Ok(out)
}
