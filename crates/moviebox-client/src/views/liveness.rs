use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one load; only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Tracks whether a view is still mounted and which load is the latest.
#[derive(Debug, Clone)]
pub struct Liveness {
    mounted: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Start a new load, superseding any in flight.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.is_mounted() && self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes() {
        let liveness = Liveness::new();
        let first = liveness.begin();
        let second = liveness.begin();
        assert!(!liveness.is_current(first));
        assert!(liveness.is_current(second));
    }

    #[test]
    fn test_unmount_invalidates_everything() {
        let liveness = Liveness::new();
        let ticket = liveness.begin();
        liveness.clone().unmount();
        assert!(!liveness.is_mounted());
        assert!(!liveness.is_current(ticket));
    }
}
