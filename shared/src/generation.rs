//! Ordering for overlapping loads of the same data.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out increasing tickets to loads as they start.
///
/// A load may publish its result only while its ticket is still current, so a
/// slow load that started before a newer one can never overwrite it.
#[derive(Debug, Default)]
pub struct LoadGeneration {
    latest: AtomicU64,
}

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a load that is starting now
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True if no load has started since `ticket` was handed out
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
