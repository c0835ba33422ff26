//! Small formatting helpers shared by the views.

use colloquy_core::Timestamp;

/// Human-readable gap between two instants: `<1s`, `42s`, `3m`, `3m 12s`.
pub fn format_elapsed(from: Timestamp, to: Timestamp) -> String {
    let seconds = (to - from).num_seconds().abs();
    if seconds == 0 {
        return "<1s".to_string();
    }
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    if minutes == 0 {
        format!("{seconds}s")
    } else if seconds == 0 {
        format!("{minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// Clip to `max` characters, appending an ellipsis when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{clipped}\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(seconds: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    #[test]
    fn sub_second_gap() {
        assert_eq!(format_elapsed(at(0), at(0)), "<1s");
    }

    #[test]
    fn seconds_only() {
        assert_eq!(format_elapsed(at(0), at(42)), "42s");
    }

    #[test]
    fn whole_minutes() {
        assert_eq!(format_elapsed(at(0), at(180)), "3m");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_elapsed(at(0), at(192)), "3m 12s");
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(format_elapsed(at(42), at(0)), "42s");
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_clips_with_ellipsis() {
        assert_eq!(truncate("a very long line", 7), "a very\u{2026}");
    }
}
