//! Date parsing shared by the `format_date` operation and the Atom view.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Interpret a JSON value as a UTC instant.
///
/// Accepts RFC 3339 and RFC 2822 strings, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DD`, and integer Unix timestamps (seconds).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        Value::String(s) => parse_str(s.trim()),
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// RFC 3339 with second precision and a `Z` suffix, as Atom expects.
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_date() {
        let dt = parse_timestamp(&json!("2020-01-01")).unwrap();
        assert_eq!(to_rfc3339(&dt), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_rfc3339_with_offset() {
        let dt = parse_timestamp(&json!("2013-08-31T12:00:00+02:00")).unwrap();
        assert_eq!(to_rfc3339(&dt), "2013-08-31T10:00:00Z");
    }

    #[test]
    fn test_sql_datetime_and_unix() {
        let dt = parse_timestamp(&json!("2013-07-04 09:30:00")).unwrap();
        assert_eq!(to_rfc3339(&dt), "2013-07-04T09:30:00Z");

        let dt = parse_timestamp(&json!(0)).unwrap();
        assert_eq!(to_rfc3339(&dt), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_timestamp(&json!("last tuesday")).is_none());
        assert!(parse_timestamp(&json!(null)).is_none());
        assert!(parse_timestamp(&json!(1.5)).is_none());
    }
}
