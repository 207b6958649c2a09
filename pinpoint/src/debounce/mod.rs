//! Trailing-edge debounce for bursty input channels.
//!
//! The picker sees two bursty inputs:
//! - **Camera settles**: a drag with momentum can come to rest several
//!   times in quick succession
//! - **Search keystrokes**: every edit of the query fires a change event
//!
//! Each channel gets its own [`Debounce`] cell. A submission replaces any
//! pending value and restarts the quiet window; only the value standing
//! when the window elapses is delivered. The cell is clock-injected and
//! does no waiting itself: the session selects on [`Debounce::deadline`]
//! and calls [`Debounce::fire`] when it wakes.

use std::time::{Duration, Instant};

/// A single debounced input channel.
///
/// Holds at most one pending value. Trailing-edge semantics: the deadline
/// restarts on every submission, so a burst of N submissions delivers
/// exactly the last value, once.
#[derive(Debug)]
pub struct Debounce<T> {
    /// Quiet window between the last submission and delivery.
    window: Duration,

    /// The value waiting to fire, with its delivery deadline.
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    /// Creates a debounce cell with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The configured quiet window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Submits a value, replacing any pending one and restarting the
    /// window from `now`.
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// The instant the pending value becomes due, if one is armed.
    ///
    /// Drive this with `tokio::time::sleep_until`; an unarmed cell has no
    /// deadline and must not wake the driver.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// True while a value is waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value if its quiet window has elapsed.
    ///
    /// Returns `None` when nothing is armed or the deadline is still in
    /// the future. Firing disarms the cell; the next submission starts a
    /// fresh window.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Drops the pending value without delivering it.
    ///
    /// Returns true if a value was discarded. Used on teardown and when a
    /// channel's input becomes irrelevant (e.g. search dismissed).
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_ms(ms: u64) -> Debounce<&'static str> {
        Debounce::new(Duration::from_millis(ms))
    }

    #[test]
    fn test_fires_after_quiet_window() {
        let mut cell = window_ms(500);
        let start = Instant::now();

        cell.submit("v1", start);
        assert!(cell.is_armed());

        // Not due yet
        assert_eq!(cell.fire(start + Duration::from_millis(499)), None);
        assert!(cell.is_armed());

        // Due exactly at the deadline
        assert_eq!(cell.fire(start + Duration::from_millis(500)), Some("v1"));
        assert!(!cell.is_armed(), "Firing disarms the cell");
    }

    #[test]
    fn test_burst_delivers_only_last_value() {
        let mut cell = window_ms(300);
        let start = Instant::now();

        // v1..v5 in rapid succession
        for (i, value) in ["v1", "v2", "v3", "v4", "v5"].iter().enumerate() {
            cell.submit(*value, start + Duration::from_millis(10 * i as u64));
        }

        // The window restarted with each submission; only v5 is pending
        let last_submit = start + Duration::from_millis(40);
        assert_eq!(cell.fire(last_submit + Duration::from_millis(299)), None);
        assert_eq!(cell.fire(last_submit + Duration::from_millis(300)), Some("v5"));

        // Nothing left to deliver
        assert_eq!(cell.fire(last_submit + Duration::from_millis(600)), None);
    }

    #[test]
    fn test_submission_restarts_window() {
        let mut cell = window_ms(500);
        let start = Instant::now();

        cell.submit("v1", start);
        // Resubmit just before the deadline
        cell.submit("v2", start + Duration::from_millis(400));

        // The original deadline passes without firing
        assert_eq!(cell.fire(start + Duration::from_millis(500)), None);

        // The restarted deadline delivers the replacement
        assert_eq!(cell.fire(start + Duration::from_millis(900)), Some("v2"));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut cell = window_ms(300);
        let start = Instant::now();

        cell.submit("v1", start);
        assert!(cell.cancel(), "Cancel should report a dropped value");
        assert!(!cell.is_armed());

        // Long after the would-be deadline, nothing fires
        assert_eq!(cell.fire(start + Duration::from_secs(10)), None);

        // Cancelling an empty cell is a no-op
        assert!(!cell.cancel());
    }

    #[test]
    fn test_rearm_after_fire() {
        let mut cell = window_ms(300);
        let start = Instant::now();

        cell.submit("v1", start);
        assert_eq!(cell.fire(start + Duration::from_millis(300)), Some("v1"));

        // A fresh submission arms a fresh window
        cell.submit("v2", start + Duration::from_millis(400));
        assert_eq!(cell.deadline(), Some(start + Duration::from_millis(700)));
        assert_eq!(cell.fire(start + Duration::from_millis(700)), Some("v2"));
    }

    #[test]
    fn test_deadline_tracks_latest_submission() {
        let mut cell = window_ms(500);
        let start = Instant::now();

        assert_eq!(cell.deadline(), None);

        cell.submit("v1", start);
        assert_eq!(cell.deadline(), Some(start + Duration::from_millis(500)));

        cell.submit("v2", start + Duration::from_millis(100));
        assert_eq!(cell.deadline(), Some(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_zero_window_fires_immediately() {
        let mut cell = window_ms(0);
        let start = Instant::now();

        cell.submit("v1", start);
        assert_eq!(cell.fire(start), Some("v1"));
    }
}
