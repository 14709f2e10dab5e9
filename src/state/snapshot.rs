//! Authoritative timer record as supplied by the lookup service

use std::{fmt, path::Path, str::FromStr};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of every timer identifier
pub const TIMER_ID_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timer id {0:?}: expected 6 alphanumeric characters")]
pub struct InvalidTimerId(pub String);

/// Opaque 6-character timer identifier, normalized to uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimerId(String);

impl TimerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TimerId {
    type Err = InvalidTimerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != TIMER_ID_LEN || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidTimerId(s.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for TimerId {
    type Error = InvalidTimerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimerId> for String {
    fn from(id: TimerId) -> Self {
        id.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-side view of a timer at lookup time.
///
/// Timestamps are epoch milliseconds; `start_time == 0` means the timer
/// has never been started. `last_pause` is only meaningful while
/// `is_running` is false, and `time_in_pause` is the credit that offsets
/// the elapsed-since-start term across every pause/resume cycle so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub timer_id: TimerId,
    #[serde(default)]
    pub is_owner: bool,
    /// Total configured length in milliseconds
    pub duration: u64,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub last_pause: i64,
    #[serde(default)]
    pub time_in_pause: i64,
}

impl TimerSnapshot {
    /// Snapshot of a timer that exists but has never been started
    pub fn fresh(timer_id: TimerId, duration: u64, is_owner: bool) -> Self {
        Self {
            timer_id,
            is_owner,
            duration,
            is_running: false,
            start_time: 0,
            last_pause: 0,
            time_in_pause: 0,
        }
    }

    pub fn is_started(&self) -> bool {
        self.start_time > 0
    }

    /// Parse a snapshot from its JSON representation
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse timer snapshot")
    }

    /// Load a snapshot from a JSON file on disk
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
        Self::from_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_id_is_normalized_to_uppercase() {
        let id: TimerId = "abc12z".parse().unwrap();
        assert_eq!(id.as_str(), "ABC12Z");
    }

    #[test]
    fn timer_id_rejects_bad_shapes() {
        assert!("ABC".parse::<TimerId>().is_err());
        assert!("ABCDEFG".parse::<TimerId>().is_err());
        assert!("AB:DEF".parse::<TimerId>().is_err());
        assert!("".parse::<TimerId>().is_err());
    }

    #[test]
    fn parses_lookup_payload() {
        let snapshot = TimerSnapshot::from_json(
            r#"{"timerId":"qwerty","isOwner":true,"duration":60000,"isRunning":false,
                "startTime":1700000000000,"lastPause":1700000020000,"timeInPause":500}"#,
        )
        .unwrap();

        assert_eq!(snapshot.timer_id.as_str(), "QWERTY");
        assert!(snapshot.is_owner);
        assert_eq!(snapshot.duration, 60_000);
        assert!(snapshot.is_started());
        assert_eq!(snapshot.last_pause - snapshot.start_time, 20_000);
        assert_eq!(snapshot.time_in_pause, 500);
    }

    #[test]
    fn missing_optional_fields_mean_never_started() {
        let snapshot = TimerSnapshot::from_json(r#"{"timerId":"ABC123","duration":1000}"#).unwrap();
        assert_eq!(snapshot, TimerSnapshot::fresh("ABC123".parse().unwrap(), 1000, false));
    }

    #[test]
    fn invalid_timer_id_fails_to_parse() {
        assert!(TimerSnapshot::from_json(r#"{"timerId":"nope","duration":1000}"#).is_err());
    }
}
