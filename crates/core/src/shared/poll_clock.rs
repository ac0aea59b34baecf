use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use super::constants::{POLL_INTERVAL, POLL_TIMEOUT};

/// Source of the timer events that drive a polling loop.
///
/// Both methods return channels so the loop can wait on them together with a
/// cancellation signal. Tests substitute a virtual clock whose channels they
/// feed by hand.
pub trait PollClock: Send + Sync {
    /// Channel delivering one message per elapsed `interval`.
    fn ticks(&self, interval: Duration) -> Receiver<Instant>;

    /// Channel delivering a single message once `timeout` has elapsed.
    fn deadline(&self, timeout: Duration) -> Receiver<Instant>;
}

/// Wall-clock timers backed by `crossbeam_channel::tick` and `after`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl PollClock for SystemClock {
    fn ticks(&self, interval: Duration) -> Receiver<Instant> {
        crossbeam_channel::tick(interval)
    }

    fn deadline(&self, timeout: Duration) -> Receiver<Instant> {
        crossbeam_channel::after(timeout)
    }
}

/// How often to poll and how long to keep polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            timeout: POLL_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_system_clock_ticks_repeatedly() {
        let ticks = SystemClock.ticks(Duration::from_millis(1));
        for _ in 0..3 {
            ticks.recv_timeout(Duration::from_secs(1)).unwrap();
        }
    }

    #[test]
    fn test_system_clock_deadline_fires_once() {
        let deadline = SystemClock.deadline(Duration::from_millis(1));
        deadline.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(deadline.recv_timeout(Duration::from_millis(20)).is_err());
    }
}
