//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a timestamp as RFC 3339 with millisecond precision and a `Z`
/// suffix, matching what browser clients send
pub fn to_iso(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a timestamp for use inside a record folder name: the RFC 3339
/// form with `:` and `.` replaced by `-` so the result stays
/// filesystem-safe on every platform
pub fn folder_timestamp(timestamp: &DateTime<Utc>) -> String {
    to_iso(timestamp).replace([':', '.'], "-")
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn folder_timestamp_is_filesystem_safe() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 45).unwrap();
        let rendered = folder_timestamp(&ts);
        assert_eq!(rendered, "2026-01-15T09-30-45-000Z");
        assert!(!rendered.contains(':'));
        assert!(!rendered.contains('.'));
    }

    #[test]
    fn iso_round_trips_through_parse() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 45).unwrap();
        let parsed = parse_iso(&to_iso(&ts)).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn parse_accepts_offset_timestamps() {
        let parsed = parse_iso("2026-01-15T04:30:45-05:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 45).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_iso("not-a-timestamp").is_none());
        assert!(parse_iso("").is_none());
    }

    #[tokio::test]
    async fn now_successive_calls_advance() {
        let first = now();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = now();
        assert!(second > first);
    }
}
