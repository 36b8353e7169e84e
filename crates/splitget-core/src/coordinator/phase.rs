//! Session phases and their legal transitions.

use std::fmt;

/// Where a download session is in its lifecycle.
///
/// `Planning → Fetching → Assembling → Done` on success;
/// `Fetching → Cancelling → Failed` when a segment fails or the caller
/// cancels; `Planning → Failed` when planning fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Planning,
    Fetching,
    Cancelling,
    Assembling,
    Done,
    Failed,
}

impl TransferPhase {
    pub fn can_advance_to(self, next: TransferPhase) -> bool {
        use TransferPhase::*;
        matches!(
            (self, next),
            (Planning, Fetching)
                | (Planning, Done)
                | (Planning, Failed)
                | (Fetching, Assembling)
                | (Fetching, Cancelling)
                | (Cancelling, Failed)
                | (Assembling, Done)
                | (Assembling, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TransferPhase::Done | TransferPhase::Failed)
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferPhase::Planning => "planning",
            TransferPhase::Fetching => "fetching",
            TransferPhase::Cancelling => "cancelling",
            TransferPhase::Assembling => "assembling",
            TransferPhase::Done => "done",
            TransferPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Current phase of one session, logging every transition.
#[derive(Debug)]
pub(crate) struct PhaseTracker<'a> {
    url: &'a str,
    current: TransferPhase,
    history: Vec<TransferPhase>,
}

impl<'a> PhaseTracker<'a> {
    pub(crate) fn new(url: &'a str) -> Self {
        tracing::debug!(url, phase = %TransferPhase::Planning, "session started");
        Self {
            url,
            current: TransferPhase::Planning,
            history: vec![TransferPhase::Planning],
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> TransferPhase {
        self.current
    }

    pub(crate) fn advance(&mut self, next: TransferPhase) {
        debug_assert!(
            self.current.can_advance_to(next),
            "illegal phase transition {} -> {}",
            self.current,
            next
        );
        tracing::debug!(url = self.url, from = %self.current, to = %next, "phase transition");
        self.current = next;
        self.history.push(next);
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &[TransferPhase] {
        &self.history
    }
}
