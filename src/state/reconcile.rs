//! Reconstruction of remaining time from absolute server timestamps

use super::{Phase, TimerSnapshot};

/// Result of reconciling a snapshot against the current instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Remaining milliseconds, always within `0..=duration`
    pub time_left: u64,
    pub is_started: bool,
    pub is_paused: bool,
    pub is_ended: bool,
}

impl Reconciliation {
    /// Phase a session loaded from this reconciliation starts in
    pub fn phase(&self) -> Phase {
        if !self.is_started {
            Phase::Created
        } else if self.is_ended {
            Phase::Ended
        } else if self.is_paused {
            Phase::Paused
        } else {
            Phase::Running
        }
    }
}

/// Compute remaining time for `snapshot` at epoch millisecond `now`.
///
/// A running timer has consumed `now - start_time` minus the pause credit;
/// a paused one stopped consuming at `last_pause`.
pub fn reconcile(snapshot: &TimerSnapshot, now: i64) -> Reconciliation {
    let duration = i128::from(snapshot.duration);
    let start = i128::from(snapshot.start_time);

    let time_left = if !snapshot.is_started() {
        duration
    } else {
        let stopped_at = if snapshot.is_running {
            i128::from(now)
        } else {
            i128::from(snapshot.last_pause)
        };
        duration - (stopped_at - start) + i128::from(snapshot.time_in_pause)
    };

    // clamped into 0..=duration, so the narrowing cannot truncate
    let time_left = time_left.clamp(0, duration) as u64;
    let is_started = snapshot.is_started();

    Reconciliation {
        time_left,
        is_started,
        is_paused: is_started && !snapshot.is_running,
        is_ended: time_left == 0,
    }
}
