//! Session cancellation: one shared flag, set once and never cleared.
//!
//! The coordinator sets it on the first segment failure; the CLI sets it on
//! Ctrl-C. Workers check it before writing every chunk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to the session's cancel flag. Reads are wait-free.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns true for the call that actually flipped
    /// the flag, so the first requester can log why.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
