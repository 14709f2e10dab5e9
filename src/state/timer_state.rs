//! Local countdown state and its published view

use serde::{Deserialize, Serialize};

use super::TimerId;
use crate::utils::format_remaining;

/// Local state-machine phase of a shared countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Created,
    Running,
    Paused,
    Ended,
}

/// Mutable state owned by one timer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    /// Displayed remaining milliseconds
    pub time_left: u64,
    /// Connected clients, tracked by owners only
    pub client_count: u32,
}

impl SessionState {
    pub fn new(phase: Phase, time_left: u64) -> Self {
        Self {
            phase,
            time_left,
            client_count: 0,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

/// Snapshot of a session published to observers (status API, logs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub timer_id: TimerId,
    pub is_owner: bool,
    pub connected: bool,
    pub phase: Phase,
    pub duration: u64,
    pub time_left: u64,
    /// `time_left` rendered as `HH:MM:SS`, `MM:SS` or `00:SS`
    pub remaining: String,
    pub progress_percent: f64,
    /// Only reported to owners
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_count: Option<u32>,
}

impl SessionStatus {
    pub fn new(
        timer_id: TimerId,
        is_owner: bool,
        connected: bool,
        duration: u64,
        state: &SessionState,
    ) -> Self {
        let progress_percent = if duration == 0 {
            0.0
        } else {
            state.time_left as f64 / duration as f64 * 100.0
        };

        Self {
            timer_id,
            is_owner,
            connected,
            phase: state.phase,
            duration,
            time_left: state.time_left,
            remaining: format_remaining(state.time_left),
            progress_percent,
            client_count: is_owner.then_some(state.client_count),
        }
    }
}
