//! Tests for date argument parsing.

use crate::cli::commands::parse_date;

#[test]
fn parses_plain_dates_as_midnight_utc() {
    assert_eq!(parse_date("1970-01-01").unwrap(), 0);
    assert_eq!(parse_date("2019-01-01").unwrap(), 1_546_300_800);
}

#[test]
fn parses_rfc3339_timestamps() {
    assert_eq!(parse_date("2019-01-01T00:00:00Z").unwrap(), 1_546_300_800);
    assert_eq!(parse_date("2019-01-01T01:00:00+01:00").unwrap(), 1_546_300_800);
}

#[test]
fn rejects_garbage() {
    assert!(parse_date("yesterday").is_err());
    assert!(parse_date("2019-13-01").is_err());
}
