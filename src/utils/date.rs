use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::AppError;

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    let s = s.trim();
    // Try YYYYMMDD
    if s.len() == 8
        && let Ok(d) = NaiveDate::parse_from_str(s, "%Y%m%d")
    {
        return Ok(d);
    }
    // Try YYYY-MM-DD
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    Err(AppError::InvalidDate {
        input: s.to_string(),
    })
}

/// Parse a row timestamp. Offsets are honoured; naive timestamps are UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres text output: "2025-01-06 09:00:00+00"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_compact_and_dashed() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_date("20250115").unwrap(), expected);
        assert_eq!(parse_date("2025-01-15").unwrap(), expected);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = parse_date("15/01/2025").unwrap_err();
        assert!(err.to_string().contains("15/01/2025"));
    }

    #[test]
    fn parse_timestamp_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-01-06T09:00:00+07:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-06T02:00:00+00:00");
    }

    #[test]
    fn parse_timestamp_naive_is_utc() {
        let dt = parse_timestamp("2025-01-06T09:00:00.250").unwrap();
        assert_eq!(dt.timestamp_millis() % 1000, 250);
        assert_eq!(dt.format("%H:%M").to_string(), "09:00");
    }

    #[test]
    fn parse_timestamp_postgres_text() {
        let dt = parse_timestamp("2025-01-06 09:00:00+00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-01-06 09:00");
    }

    #[test]
    fn parse_timestamp_invalid() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
