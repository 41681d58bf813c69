//! Delivery counters
//!
//! Counters are updated with relaxed atomics from the broadcasting thread
//! and from delivery tasks. `dispatched` is bumped before a task is spawned,
//! so at any quiescent point `dispatched == delivered + dropped`.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct BrokerStats {
    broadcasts: AtomicUsize,
    dispatched: AtomicUsize,
    delivered: AtomicUsize,
    dropped: AtomicUsize,
}

impl BrokerStats {
    /// Total number of `broadcast` calls.
    pub fn broadcasts(&self) -> usize {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Delivery tasks handed to the scheduler.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Deliveries discarded because the subscriber was destroyed.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Deliveries dispatched but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.dispatched()
            .saturating_sub(self.delivered() + self.dropped())
    }

    pub(crate) fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}
