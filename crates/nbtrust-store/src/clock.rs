use chrono::{DateTime, NaiveDateTime, Utc};

/// Layout of the `last_seen` column: UTC, millisecond precision, no zone
/// suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Issues strictly increasing `last_seen` stamps.
///
/// Wall-clock milliseconds collide easily when signatures are stored in a
/// burst, and a cull ordered by a tied column would drop an arbitrary
/// survivor. Each stamp is therefore at least one millisecond after the
/// previous one handed out by the same clock.
#[derive(Debug, Default)]
pub struct LastSeenClock {
    last_millis: Option<i64>,
}

impl LastSeenClock {
    /// Creates a clock with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next stamp, formatted for storage.
    pub fn next(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let millis = match self.last_millis {
            Some(prev) if now <= prev => prev + 1,
            _ => now,
        };
        self.last_millis = Some(millis);
        format_timestamp(&DateTime::from_timestamp_millis(millis).unwrap_or_default().naive_utc())
    }
}

/// Formats a timestamp for the `last_seen` column.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a `last_seen` value. Accepts any fractional precision, so rows
/// written by nbformat (microseconds) read back as well.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_strictly_increase() {
        let mut clock = LastSeenClock::new();
        let stamps: Vec<String> = (0..50).map(|_| clock.next()).collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn stamp_layout() {
        let mut clock = LastSeenClock::new();
        let stamp = clock.next();
        assert_eq!(stamp.len(), "2024-01-01 00:00:00.000".len());
        assert_eq!(&stamp[10..11], " ");
        assert!(!stamp.ends_with('Z'));
        assert!(parse_timestamp(&stamp).is_some());
    }

    #[test]
    fn parses_microsecond_rows() {
        let parsed = parse_timestamp("2024-03-01 12:30:45.123456").unwrap();
        assert_eq!(format_timestamp(&parsed), "2024-03-01 12:30:45.123");
    }
}
