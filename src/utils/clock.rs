//! Wall-clock access

use chrono::Utc;

/// Current time as epoch milliseconds, the unit of every snapshot timestamp
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
