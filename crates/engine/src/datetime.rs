//! Date and wall-time helpers.
//!
//! Transactions are issued at a local wall time with no offset: the form
//! collects a calendar date and an `HH:mm` string and the backend stores the
//! combination as a naive ISO-8601 timestamp.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{EngineError, ResultEngine};

const TIME_FORMAT: &str = "%H:%M";

/// Parses an `HH:mm` wall time.
pub fn parse_time(value: &str) -> ResultEngine<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| EngineError::InvalidTime(format!("expected HH:mm, got '{}'", value.trim())))
}

/// Formats a wall time as `HH:mm`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Drops seconds: the form only edits `HH:mm`.
#[must_use]
pub fn to_minutes(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Combines a calendar date and a wall time (see [`parse_time`]) into the
/// local timestamp sent to the backend. Seconds are always zero.
#[must_use]
pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(to_minutes(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_builds_naive_iso_timestamp() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 4).unwrap();
        let issued = combine(date, parse_time("09:05").unwrap());
        assert_eq!(
            issued.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2023-03-04T09:05:00"
        );
    }

    #[test]
    fn rejects_malformed_time() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 4).unwrap();
        assert!(matches!(
            parse_time("9h05"),
            Err(EngineError::InvalidTime(_))
        ));
        let late = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(combine(date, late).format("%H:%M:%S").to_string(), "23:59:00");
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn format_round_trips() {
        let time = parse_time(" 23:59 ").unwrap();
        assert_eq!(format_time(time), "23:59");
    }
}
