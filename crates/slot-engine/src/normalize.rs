//! Time normalization -- external date/time values into zoned instants.
//!
//! Callers hand the engine ISO-8601 strings, zoned `DateTime`s, naive
//! date-times or plain dates. Everything is converted into a `DateTime<Tz>`
//! expressed in one reference timezone before any bucketing happens, so a
//! block entered in one zone and queried in another land in the same bucket.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::dst;
use crate::error::{AvailabilityError, Result};

/// Calendar date bucket key (`YYYY-MM-DD` when serialized).
pub type DateKey = NaiveDate;

/// Hour-of-day bucket key, `0..=23`.
pub type HourKey = u32;

/// Formats tried, in order, for strings without a UTC offset.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats tried for strings with an explicit offset that RFC 3339 rejects.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M%:z"];

/// A date/time value in any representation the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TemporalInput {
    /// ISO-8601 text, with or without an offset.
    Text(String),
    /// An already-zoned instant.
    Instant(DateTime<FixedOffset>),
    /// A wall-clock value in the target timezone.
    Local(NaiveDateTime),
    /// Midnight of a calendar date in the target timezone.
    Date(NaiveDate),
}

impl From<&str> for TemporalInput {
    fn from(s: &str) -> Self {
        TemporalInput::Text(s.to_string())
    }
}

impl From<String> for TemporalInput {
    fn from(s: String) -> Self {
        TemporalInput::Text(s)
    }
}

impl From<&String> for TemporalInput {
    fn from(s: &String) -> Self {
        TemporalInput::Text(s.clone())
    }
}

impl<T: TimeZone> From<DateTime<T>> for TemporalInput {
    fn from(dt: DateTime<T>) -> Self {
        TemporalInput::Instant(dt.fixed_offset())
    }
}

impl<T: TimeZone> From<&DateTime<T>> for TemporalInput {
    fn from(dt: &DateTime<T>) -> Self {
        TemporalInput::Instant(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for TemporalInput {
    fn from(dt: NaiveDateTime) -> Self {
        TemporalInput::Local(dt)
    }
}

impl From<NaiveDate> for TemporalInput {
    fn from(d: NaiveDate) -> Self {
        TemporalInput::Date(d)
    }
}

impl From<&TemporalInput> for TemporalInput {
    fn from(input: &TemporalInput) -> Self {
        input.clone()
    }
}

/// Normalize `input` into an instant expressed in `tz`.
///
/// Zoned values keep their instant. Values without an offset are read as
/// wall-clock time in `tz` (see [`dst::resolve_local`] for folds and gaps).
///
/// # Errors
/// Returns `AvailabilityError::InvalidTemporalValue` if a string cannot be
/// parsed by any supported format.
pub fn normalize(input: impl Into<TemporalInput>, tz: &Tz) -> Result<DateTime<Tz>> {
    match input.into() {
        TemporalInput::Text(s) => parse_text(&s, tz),
        TemporalInput::Instant(dt) => Ok(dt.with_timezone(tz)),
        TemporalInput::Local(local) => Ok(dst::resolve_local(tz, local)),
        TemporalInput::Date(date) => Ok(dst::resolve_local(tz, date.and_time(NaiveTime::MIN))),
    }
}

fn parse_text(raw: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(AvailabilityError::InvalidTemporalValue(
            "empty date/time string".to_string(),
        ));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(tz));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(tz));
        }
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dst::resolve_local(tz, local));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(dst::resolve_local(tz, date.and_time(NaiveTime::MIN)));
    }

    Err(AvailabilityError::InvalidTemporalValue(format!("'{}'", raw)))
}

/// Parse a wall-clock time of day, `HH:mm` or `HH:mm:ss`.
///
/// # Errors
/// Returns `AvailabilityError::InvalidTemporalValue` for anything else.
pub fn parse_wall_clock(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| AvailabilityError::InvalidTemporalValue(format!("time of day '{}'", s)))
}

/// Parse an IANA timezone name.
///
/// # Errors
/// Returns `AvailabilityError::InvalidTimezone` for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| AvailabilityError::InvalidTimezone(name.to_string()))
}

/// The `(date, hour)` bucket of `instant`, computed in the reference zone.
pub fn bucket_key<T: TimeZone>(instant: &DateTime<T>, reference: &Tz) -> (DateKey, HourKey) {
    let local = instant.with_timezone(reference);
    (local.date_naive(), local.hour())
}

/// The last millisecond of the calendar day containing `instant`.
pub fn end_of_day(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let last = instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| instant.naive_local());
    dst::resolve_local(&instant.timezone(), last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::US::Pacific;

    #[test]
    fn naive_string_is_wall_clock_in_target_zone() {
        let dt = normalize("2016-06-21 13:30", &Pacific).unwrap();
        assert_eq!(dt.to_rfc3339(), "2016-06-21T13:30:00-07:00");
    }

    #[test]
    fn offset_string_keeps_instant() {
        let dt = normalize("2016-06-21T13:30:00Z", &Pacific).unwrap();
        assert_eq!(dt.with_timezone(&Utc).to_rfc3339(), "2016-06-21T13:30:00+00:00");
        assert_eq!(dt.naive_local().to_string(), "2016-06-21 06:30:00");
    }

    #[test]
    fn plain_date_is_local_midnight() {
        let dt = normalize("2016-06-01", &chrono_tz::UTC).unwrap();
        assert_eq!(dt.to_rfc3339(), "2016-06-01T00:00:00+00:00");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = normalize("next tuesday", &chrono_tz::UTC).unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidTemporalValue(_)));
    }

    #[test]
    fn wall_clock_accepts_optional_seconds() {
        assert_eq!(parse_wall_clock("09:00").unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(
            parse_wall_clock("17:30:15").unwrap(),
            NaiveTime::from_hms_opt(17, 30, 15).unwrap()
        );
        assert!(parse_wall_clock("9am").is_err());
    }

    #[test]
    fn end_of_day_is_last_millisecond() {
        let dt = normalize("2016-06-01 10:15", &chrono_tz::UTC).unwrap();
        assert_eq!(end_of_day(&dt).to_rfc3339(), "2016-06-01T23:59:59.999+00:00");
    }
}
