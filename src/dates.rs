// Tolerant date parsing
//
// Unparseable or empty dates become None and never abort the run.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a date cell. ISO forms come first; slash and dash dates are read
/// month-first and fall back to day-first when the month would be out of range.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 with offset, e.g. 2025-03-01T10:00:00-03:00
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Month number (1-12) when the date falls in `year`
pub fn month_in_year(date: Option<NaiveDate>, year: i32) -> Option<u32> {
    date.filter(|d| d.year() == year).map(|d| d.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2025-03-14"), NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(parse_date(" 2025-03-14 "), NaiveDate::from_ymd_opt(2025, 3, 14));
    }

    #[test]
    fn test_parse_datetime_keeps_date() {
        assert_eq!(
            parse_date("2025-11-02 18:45:00"),
            NaiveDate::from_ymd_opt(2025, 11, 2)
        );
        assert_eq!(
            parse_date("2025-11-02T18:45:00"),
            NaiveDate::from_ymd_opt(2025, 11, 2)
        );
    }

    #[test]
    fn test_parse_slash_dates() {
        assert_eq!(parse_date("03/04/2025"), NaiveDate::from_ymd_opt(2025, 3, 4));
        // 25 can't be a month, so this is day-first
        assert_eq!(parse_date("25/04/2025"), NaiveDate::from_ymd_opt(2025, 4, 25));
    }

    #[test]
    fn test_parse_dash_dates_month_first() {
        assert_eq!(parse_date("01-03-2025"), NaiveDate::from_ymd_opt(2025, 1, 3));
        assert_eq!(parse_date("25-03-2025"), NaiveDate::from_ymd_opt(2025, 3, 25));
    }

    #[test]
    fn test_unparseable_dates_are_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2025-13-45"), None);
    }

    #[test]
    fn test_month_in_year() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1);
        assert_eq!(month_in_year(date, 2025), Some(7));
        assert_eq!(month_in_year(date, 2024), None);
        assert_eq!(month_in_year(None, 2025), None);
    }
}
