//! Session telemetry for observability and debugging.
//!
//! Lock-free counters recording what the selection pipeline did, with a
//! point-in-time snapshot for display:
//!
//! ```text
//! Session loop ─────► SessionMetrics ─────► MetricsSnapshot ─────► Views
//!                     (atomic counters)     (point-in-time copy)   (CLI, logs)
//! ```
//!
//! Counters only ever increase; rates and deltas are the consumer's
//! business.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters for one picker session.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    camera_events: AtomicU64,
    system_moves_suppressed: AtomicU64,
    debounce_fires: AtomicU64,
    reverse_requests: AtomicU64,
    search_requests: AtomicU64,
    stale_responses_dropped: AtomicU64,
    gateway_failures: AtomicU64,
    snapshots_published: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera event arrived from the surface.
    pub fn camera_event(&self) {
        self.camera_events.fetch_add(1, Ordering::Relaxed);
    }

    /// A camera event was attributed to our own recenter and dropped.
    pub fn system_move_suppressed(&self) {
        self.system_moves_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// A debounce window elapsed and delivered its value.
    pub fn debounce_fired(&self) {
        self.debounce_fires.fetch_add(1, Ordering::Relaxed);
    }

    /// A reverse-geocode request was issued.
    pub fn reverse_request(&self) {
        self.reverse_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// A forward-search request was issued.
    pub fn search_request(&self) {
        self.search_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// A response arrived after being superseded and was discarded.
    pub fn stale_response_dropped(&self) {
        self.stale_responses_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A gateway call failed.
    pub fn gateway_failure(&self) {
        self.gateway_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A new selection snapshot was published.
    pub fn snapshot_published(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy for display.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            camera_events: self.camera_events.load(Ordering::Relaxed),
            system_moves_suppressed: self.system_moves_suppressed.load(Ordering::Relaxed),
            debounce_fires: self.debounce_fires.load(Ordering::Relaxed),
            reverse_requests: self.reverse_requests.load(Ordering::Relaxed),
            search_requests: self.search_requests.load(Ordering::Relaxed),
            stale_responses_dropped: self.stale_responses_dropped.load(Ordering::Relaxed),
            gateway_failures: self.gateway_failures.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub camera_events: u64,
    pub system_moves_suppressed: u64,
    pub debounce_fires: u64,
    pub reverse_requests: u64,
    pub search_requests: u64,
    pub stale_responses_dropped: u64,
    pub gateway_failures: u64,
    pub snapshots_published: u64,
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "camera: {} ({} suppressed), debounce: {}, reverse: {}, search: {}, stale: {}, failures: {}, snapshots: {}",
            self.camera_events,
            self.system_moves_suppressed,
            self.debounce_fires,
            self.reverse_requests,
            self.search_requests,
            self.stale_responses_dropped,
            self.gateway_failures,
            self.snapshots_published,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = SessionMetrics::new();

        metrics.camera_event();
        metrics.camera_event();
        metrics.system_move_suppressed();
        metrics.reverse_request();
        metrics.stale_response_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.camera_events, 2);
        assert_eq!(snapshot.system_moves_suppressed, 1);
        assert_eq!(snapshot.reverse_requests, 1);
        assert_eq!(snapshot.stale_responses_dropped, 1);
        assert_eq!(snapshot.search_requests, 0);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let metrics = SessionMetrics::new();
        let before = metrics.snapshot();
        metrics.gateway_failure();
        let after = metrics.snapshot();

        assert_eq!(before.gateway_failures, 0);
        assert_eq!(after.gateway_failures, 1);
    }

    #[test]
    fn test_display_format() {
        let metrics = SessionMetrics::new();
        metrics.camera_event();
        metrics.snapshot_published();

        let line = format!("{}", metrics.snapshot());
        assert!(line.contains("camera: 1"));
        assert!(line.contains("snapshots: 1"));
    }
}
