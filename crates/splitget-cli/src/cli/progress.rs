//! Terminal progress: one bar per segment plus a total bar.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use splitget_core::{ProgressSink, TransferPlan};
use std::cell::RefCell;

const TOTAL_STYLE: &str =
    "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SEGMENT_STYLE: &str = "  {prefix:>4} {bar:40.green/white} {bytes}/{total_bytes}";
const UNKNOWN_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {bytes} ({bytes_per_sec})";
const PB_CHARS: &str = "█▓▒░  ";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .map(|s| s.progress_chars(PB_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

struct Bars {
    total: ProgressBar,
    segments: Vec<ProgressBar>,
}

/// [`ProgressSink`] drawing indicatif bars on stderr.
#[derive(Default)]
pub struct BarSink {
    multi: MultiProgress,
    bars: RefCell<Option<Bars>>,
}

impl BarSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for BarSink {
    fn begin(&self, plan: &TransferPlan) {
        let total = match plan.total_size {
            Some(len) => {
                let _ = self
                    .multi
                    .println(format!("File size: {:.2} MiB", len as f64 / 1_048_576.0));
                let pb = self.multi.add(ProgressBar::new(len));
                pb.set_style(style(TOTAL_STYLE));
                pb
            }
            None => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(style(UNKNOWN_STYLE));
                pb
            }
        };

        let segments = if plan.segment_count() > 1 {
            plan.tasks()
                .iter()
                .map(|task| {
                    let pb = self.multi.add(ProgressBar::new(task.expected_len.unwrap_or(0)));
                    pb.set_style(style(SEGMENT_STYLE));
                    pb.set_prefix(format!("#{}", task.index));
                    pb
                })
                .collect()
        } else {
            Vec::new()
        };
        *self.bars.borrow_mut() = Some(Bars { total, segments });
    }

    fn update_segment(&self, index: usize, delta: u64) {
        if let Some(pb) = self.bars.borrow().as_ref().and_then(|b| b.segments.get(index)) {
            pb.inc(delta);
        }
    }

    fn update_total(&self, total: u64) {
        if let Some(bars) = self.bars.borrow().as_ref() {
            bars.total.set_position(total);
        }
    }

    fn close_segment(&self, index: usize) {
        if let Some(pb) = self.bars.borrow().as_ref().and_then(|b| b.segments.get(index)) {
            pb.finish();
        }
    }

    fn close(&self) {
        if let Some(bars) = self.bars.borrow_mut().take() {
            for pb in &bars.segments {
                if !pb.is_finished() {
                    pb.abandon();
                }
            }
            bars.total.finish();
        }
    }
}
