//! Process-wide comet statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the request handler
///
/// Shared across all in-flight requests; all updates are relaxed atomic
/// increments.
#[derive(Debug, Default)]
pub struct CometStats {
    requests: AtomicU64,
    waits: AtomicU64,
    events: AtomicU64,
    timeouts: AtomicU64,
    ended_notices: AtomicU64,
}

impl CometStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_events(&self, count: u64) {
        self.events.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ended_notices(&self, count: u64) {
        self.ended_notices.fetch_add(count, Ordering::Relaxed);
    }

    /// A consistent-enough copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            events: self.events.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            ended_notices: self.ended_notices.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`CometStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Comet requests accepted (content-type matched)
    pub requests: u64,
    /// Requests that entered the wait phase
    pub waits: u64,
    /// Events serialized into responses
    pub events: u64,
    /// Waits that ended without an event
    pub timeouts: u64,
    /// ENDED notices sent for unknown ids
    pub ended_notices: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = CometStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = CometStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_wait();
        stats.record_events(3);
        stats.record_timeout();
        stats.record_ended_notices(2);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.waits, 1);
        assert_eq!(snapshot.events, 3);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.ended_notices, 2);
    }
}
