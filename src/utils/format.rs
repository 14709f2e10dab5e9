//! Human-readable rendering of remaining time

/// Render milliseconds as `HH:MM:SS`, `MM:SS` or `00:SS`
pub fn format_remaining(millis: u64) -> String {
    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_magnitude() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(999), "00:00");
        assert_eq!(format_remaining(9_500), "00:09");
        assert_eq!(format_remaining(61_000), "01:01");
        assert_eq!(format_remaining(3_600_000), "01:00:00");
        assert_eq!(format_remaining(36_125_000), "10:02:05");
    }
}
