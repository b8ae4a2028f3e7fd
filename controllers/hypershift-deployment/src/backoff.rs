//! # Fibonacci Backoff
//!
//! Requeue delays for failed reconciliations, tracked per HypershiftDeployment.
//! The sequence is counted in minutes: 1m, 1m, 2m, 3m, 5m, 8m, then capped at 10m.

use crate::constants::{BACKOFF_MAX_MINUTES, BACKOFF_MIN_MINUTES};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Fibonacci backoff sequence capped at a maximum.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    max_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
        }
    }

    /// Returns the current delay and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_secs(self.current_minutes * 60);
        let next = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = next.min(self.max_minutes);
        delay
    }

    /// Largest delay the sequence will return
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_minutes * 60)
    }

    /// Restart the sequence after a successful pass
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(BACKOFF_MIN_MINUTES, BACKOFF_MAX_MINUTES)
    }
}

/// Backoff state per resource key (`namespace/name`).
#[derive(Debug, Clone, Default)]
pub struct BackoffTracker {
    states: Arc<Mutex<HashMap<String, FibonacciBackoff>>>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn states(&self) -> MutexGuard<'_, HashMap<String, FibonacciBackoff>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next requeue delay for `key`, advancing its sequence
    pub fn next_delay(&self, key: &str) -> Duration {
        self.states().entry(key.to_string()).or_default().next_delay()
    }

    /// Delay used for failures that retrying cannot fix
    pub fn max_delay(&self) -> Duration {
        FibonacciBackoff::default().max_delay()
    }

    /// Forget the failure history of `key`
    pub fn reset(&self, key: &str) {
        self.states().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(d: Duration) -> u64 {
        d.as_secs() / 60
    }

    #[test]
    fn test_sequence_is_capped() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        let seq: Vec<u64> = (0..9).map(|_| minutes(backoff.next_delay())).collect();
        assert_eq!(seq, vec![1, 1, 2, 3, 5, 8, 10, 10, 10]);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = FibonacciBackoff::default();
        backoff.next_delay();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(60));
    }

    #[test]
    fn test_tracker_keeps_keys_independent() {
        let tracker = BackoffTracker::new();
        tracker.next_delay("team-a/hd");
        tracker.next_delay("team-a/hd");
        assert_eq!(minutes(tracker.next_delay("team-a/hd")), 2);
        assert_eq!(minutes(tracker.next_delay("team-b/hd")), 1);

        tracker.reset("team-a/hd");
        assert_eq!(minutes(tracker.next_delay("team-a/hd")), 1);
    }

    #[test]
    fn test_max_delay() {
        assert_eq!(BackoffTracker::new().max_delay(), Duration::from_secs(600));
    }
}
