//! Formatting helpers for transport widgets

/// `m:ss` clock text for a millisecond position
pub fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// `m:ss ~ m:ss` text for a range
pub fn format_range(start_ms: u64, end_ms: u64) -> String {
    format!("{} ~ {}", format_timestamp(start_ms), format_timestamp(end_ms))
}

/// Where a marker sits along a track, from 0.0 to 1.0
pub fn marker_fraction(point_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (point_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(999), "0:00");
        assert_eq!(format_timestamp(9_000), "0:09");
        assert_eq!(format_timestamp(75_500), "1:15");
        assert_eq!(format_timestamp(3_600_000), "60:00");
    }

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(30_000, 45_000), "0:30 ~ 0:45");
    }

    #[test]
    fn test_marker_fraction() {
        assert_relative_eq!(marker_fraction(30_000, 120_000), 0.25);
        assert_relative_eq!(marker_fraction(200_000, 120_000), 1.0);
        assert_relative_eq!(marker_fraction(5, 0), 0.0);
    }
}
