//! Range math and transfer planning.
//!
//! Splits a resource of known size into N inclusive byte ranges (the last
//! range absorbs the remainder) and decides between a segmented transfer and
//! a single unranged stream.

mod plan;
mod range;

pub use plan::{effective_segment_count, FetchTask, TransferMode, TransferPlan};
pub use range::{plan_segments, InvalidPlanError, Segment};
