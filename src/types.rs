use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt;

/// The date range a record's creation time must fall in to be kept.
///
/// Both ends are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Parses a timestamp as written in settings or returned by the API.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

/// Creation time of a pass-through record, if it has a readable one.
pub fn created_at(record: &Value) -> Option<DateTime<Utc>> {
    record
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

/// The issues API lists pull requests too, marked with a `pull_request` object.
pub fn is_pull_request(record: &Value) -> bool {
    record.get("pull_request").is_some_and(|marker| !marker.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = utc(2023, 1, 31, 23, 59, 59);
        assert_eq!(parse_timestamp("2023-01-31T23:59:59Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-31T23:59:59"), Some(expected));
        assert_eq!(parse_timestamp("2023-02-01T01:59:59+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-01-31"),
            Some(utc(2023, 1, 31, 0, 0, 0))
        );
        assert_eq!(parse_timestamp("31/01/2023"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = Window::new(utc(2023, 1, 1, 0, 0, 0), utc(2023, 1, 31, 23, 59, 59)).unwrap();

        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(window.contains(utc(2023, 1, 15, 12, 0, 0)));
        assert!(!window.contains(utc(2022, 12, 31, 23, 59, 59)));
        assert!(!window.contains(utc(2023, 2, 1, 0, 0, 0)));
    }

    #[test]
    fn test_window_rejects_reversed_bounds() {
        assert!(Window::new(utc(2023, 2, 1, 0, 0, 0), utc(2023, 1, 1, 0, 0, 0)).is_none());
    }

    #[test]
    fn test_mixed_offsets_compare_by_instant() {
        // As strings "2023-01-31T22:00:00-03:00" sorts before the window end,
        // but the instant is 2023-02-01T01:00:00Z.
        let window = Window::new(utc(2023, 1, 1, 0, 0, 0), utc(2023, 1, 31, 23, 59, 59)).unwrap();
        let record = json!({ "created_at": "2023-01-31T22:00:00-03:00" });

        assert!(!window.contains(created_at(&record).unwrap()));
    }

    #[test]
    fn test_record_accessors() {
        let issue = json!({ "number": 1, "created_at": "2023-01-05T10:00:00Z", "pull_request": null });
        let pr = json!({ "number": 2, "created_at": "2023-01-05T10:00:00Z", "pull_request": { "url": "x" } });
        let broken = json!({ "number": 3, "created_at": 12 });

        assert!(!is_pull_request(&issue));
        assert!(is_pull_request(&pr));
        assert_eq!(created_at(&issue), Some(utc(2023, 1, 5, 10, 0, 0)));
        assert_eq!(created_at(&broken), None);
    }
}
