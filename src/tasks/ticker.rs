//! Local countdown ticker
//!
//! Advances displayed remaining time between authoritative events. The
//! ticker is owned by exactly one session; starting it while active keeps
//! the existing schedule instead of stacking a second one.

use std::{future, time::Duration};

use tokio::time::{interval_at, Instant, Interval};
use tracing::debug;

/// Period between local countdown ticks
pub const TICK_PERIOD: Duration = Duration::from_millis(20);

/// Remaining time at or below which the next tick snaps to zero
pub const END_THRESHOLD_MS: u64 = 100;

/// Scheduled, cancellable repeating countdown process
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    end_threshold_ms: u64,
    armed: bool,
    interval: Option<Interval>,
}

impl Ticker {
    /// Create an idle ticker. The end threshold is raised to at least one
    /// period so a tick can never step below zero.
    pub fn new(period: Duration, end_threshold_ms: u64) -> Self {
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        Self {
            period,
            end_threshold_ms: end_threshold_ms.max(period_ms),
            armed: false,
            interval: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.armed
    }

    /// Arm the ticker. Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        if self.armed {
            debug!("Ticker already active, keeping current schedule");
            return false;
        }
        self.armed = true;
        self.interval = None;
        debug!("Ticker started with period {:?}", self.period);
        true
    }

    /// Cancel the ticker. Safe to call any number of times.
    pub fn stop(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        self.interval = None;
        if was_armed {
            debug!("Ticker stopped");
        }
        was_armed
    }

    /// Wait for the next tick. Never resolves while the ticker is stopped,
    /// so it can sit in a `select!` unconditionally.
    pub async fn tick(&mut self) {
        if !self.armed {
            return future::pending().await;
        }
        let period = self.period;
        let interval = self
            .interval
            .get_or_insert_with(|| interval_at(Instant::now() + period, period));
        interval.tick().await;
    }

    /// Remaining time after one tick, or `None` once the countdown is over
    pub fn step(&self, time_left: u64) -> Option<u64> {
        if time_left <= self.end_threshold_ms {
            None
        } else {
            let period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX);
            Some(time_left.saturating_sub(period_ms))
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_PERIOD, END_THRESHOLD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_decrements_by_period_until_threshold() {
        let ticker = Ticker::default();
        assert_eq!(ticker.step(1_000), Some(980));
        assert_eq!(ticker.step(101), Some(81));
        assert_eq!(ticker.step(100), None);
        assert_eq!(ticker.step(0), None);
    }

    #[test]
    fn threshold_never_below_period() {
        let ticker = Ticker::new(Duration::from_millis(250), 100);
        assert_eq!(ticker.step(250), None);
        assert_eq!(ticker.step(251), Some(1));
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut ticker = Ticker::default();
        assert!(!ticker.stop());
        assert!(ticker.start());
        assert!(!ticker.start());
        assert!(ticker.is_active());
        assert!(ticker.stop());
        assert!(!ticker.stop());
        assert!(!ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_fire_once_per_period() {
        let mut ticker = Ticker::default();
        ticker.start();

        let begin = Instant::now();
        for _ in 0..5 {
            ticker.tick().await;
        }
        assert_eq!(begin.elapsed(), TICK_PERIOD * 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_ticker_never_fires() {
        let mut ticker = Ticker::default();
        ticker.start();
        ticker.stop();

        let fired = tokio::time::timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(fired.is_err());
    }
}
