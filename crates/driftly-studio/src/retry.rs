//! Backoff and failure bookkeeping for repeated operations.
//!
//! The job poller checks status on a fixed cadence and slows down while the
//! service keeps failing. [`FailureTracker`] keeps the log readable when a
//! status endpoint is down for a long time.

use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff: `base * 2^n`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay after `failures` consecutive failures. Never below `base`.
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        let delay = self.base.saturating_mul(2u32.saturating_pow(failures.min(16)));
        delay.min(self.max.max(self.base))
    }
}

/// State tracker for repeated operations that may fail intermittently.
///
/// Logs the first few consecutive failures, then one suppression notice,
/// then nothing until the operation recovers.
#[derive(Debug, Default)]
pub struct FailureTracker {
    consecutive_failures: u32,
    max_logged_failures: u32,
    suppressed: bool,
}

impl FailureTracker {
    pub fn new(max_logged_failures: u32) -> Self {
        Self {
            consecutive_failures: 0,
            max_logged_failures,
            suppressed: false,
        }
    }

    /// Record a successful operation (resets failure count).
    pub fn record_success(&mut self) {
        if self.consecutive_failures > 0 && self.suppressed {
            debug!(
                "Operation recovered after {} consecutive failures",
                self.consecutive_failures
            );
        }
        self.consecutive_failures = 0;
        self.suppressed = false;
    }

    /// Record a failed operation.
    ///
    /// Returns `true` if this failure should be logged (not suppressed).
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;

        if self.consecutive_failures <= self.max_logged_failures {
            true
        } else if self.consecutive_failures == self.max_logged_failures + 1 {
            self.suppressed = true;
            warn!(
                "Suppressing further failure logs after {} consecutive failures",
                self.max_logged_failures
            );
            false
        } else {
            false
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_cap() {
        let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(5));

        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(backoff.delay_for_attempt(10), Duration::from_secs(5));
        assert_eq!(backoff.delay_for_attempt(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_cap_below_base() {
        let backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_secs(2));
    }

    #[test]
    fn test_failure_tracker_suppression() {
        let mut tracker = FailureTracker::new(3);

        assert!(tracker.record_failure());
        assert!(tracker.record_failure());
        assert!(tracker.record_failure());

        // 4th failure logs the suppression notice itself
        assert!(!tracker.record_failure());
        assert!(!tracker.record_failure());
        assert_eq!(tracker.failure_count(), 5);

        tracker.record_success();
        assert_eq!(tracker.failure_count(), 0);
        assert!(tracker.record_failure());
    }
}
