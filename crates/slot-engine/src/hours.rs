//! Regular weekly operating hours.
//!
//! A table of at most one `{start, end}` wall-clock window per weekday. Days
//! missing from the table have no availability at all.

use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::normalize::parse_wall_clock;

/// Weekdays indexed from Sunday, matching the `0..=6` numeric keys.
const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A configuration key naming a weekday: a name or a number `0..=6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekdayKey {
    Name(String),
    Number(i64),
}

impl WeekdayKey {
    /// Resolve the key to a weekday.
    ///
    /// Names are case-insensitive. Numeric strings are read as numbers, with
    /// `0` meaning Sunday.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidWeekdayName` for unknown names and
    /// numbers outside `0..=6`.
    pub fn resolve(&self) -> Result<Weekday> {
        match self {
            WeekdayKey::Number(n) => weekday_from_index(*n),
            WeekdayKey::Name(name) => match name.trim().parse::<i64>() {
                Ok(n) => weekday_from_index(n),
                Err(_) => weekday_from_name(name),
            },
        }
    }
}

impl fmt::Display for WeekdayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekdayKey::Name(name) => f.write_str(name),
            WeekdayKey::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for WeekdayKey {
    fn from(s: &str) -> Self {
        WeekdayKey::Name(s.to_string())
    }
}

impl From<String> for WeekdayKey {
    fn from(s: String) -> Self {
        WeekdayKey::Name(s)
    }
}

impl From<&String> for WeekdayKey {
    fn from(s: &String) -> Self {
        WeekdayKey::Name(s.clone())
    }
}

impl From<i32> for WeekdayKey {
    fn from(n: i32) -> Self {
        WeekdayKey::Number(i64::from(n))
    }
}

impl From<u8> for WeekdayKey {
    fn from(n: u8) -> Self {
        WeekdayKey::Number(i64::from(n))
    }
}

impl From<Weekday> for WeekdayKey {
    fn from(day: Weekday) -> Self {
        WeekdayKey::Number(i64::from(day.num_days_from_sunday()))
    }
}

/// Translate a weekday name (`"sunday"` .. `"saturday"`, any case).
///
/// # Errors
/// Returns `AvailabilityError::InvalidWeekdayName` for anything else.
pub fn weekday_from_name(name: &str) -> Result<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "sunday" => Ok(Weekday::Sun),
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        _ => Err(AvailabilityError::InvalidWeekdayName(name.to_string())),
    }
}

/// Translate a day number, `0` = Sunday .. `6` = Saturday.
///
/// # Errors
/// Returns `AvailabilityError::InvalidWeekdayName` outside `0..=6`.
pub fn weekday_from_index(index: i64) -> Result<Weekday> {
    usize::try_from(index)
        .ok()
        .and_then(|i| WEEKDAYS_FROM_SUNDAY.get(i).copied())
        .ok_or_else(|| AvailabilityError::InvalidWeekdayName(index.to_string()))
}

/// Raw `{start, end}` strings as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursEntry {
    pub start: String,
    pub end: String,
}

impl HoursEntry {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl From<(&str, &str)> for HoursEntry {
    fn from((start, end): (&str, &str)) -> Self {
        HoursEntry::new(start, end)
    }
}

/// A parsed wall-clock window for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperatingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl OperatingHours {
    /// Parse `HH:mm[:ss]` bounds.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` if either bound is not
    /// a wall-clock time.
    pub fn parse(entry: &HoursEntry) -> Result<Self> {
        Ok(Self {
            start: parse_wall_clock(&entry.start)?,
            end: parse_wall_clock(&entry.end)?,
        })
    }

    /// Whether `time` lies in `[start, end)`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Weekday → operating hours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegularHours {
    days: [Option<OperatingHours>; 7],
}

impl RegularHours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(weekday key, {start, end})` pairs.
    ///
    /// Later entries for the same weekday win. Nothing is returned unless
    /// every entry is valid.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidWeekdayName` for an unknown key and
    /// `AvailabilityError::InvalidTemporalValue` for an unparseable time.
    pub fn from_entries<K, V, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<WeekdayKey>,
        V: Into<HoursEntry>,
    {
        let mut table = RegularHours::new();
        for (key, entry) in entries {
            let weekday = key.into().resolve()?;
            let hours = OperatingHours::parse(&entry.into())?;
            table.days[index_of(weekday)] = Some(hours);
        }
        Ok(table)
    }

    pub fn get(&self, weekday: Weekday) -> Option<&OperatingHours> {
        self.days[index_of(weekday)].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    /// Configured days, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &OperatingHours)> {
        WEEKDAYS_FROM_SUNDAY
            .iter()
            .zip(self.days.iter())
            .filter_map(|(day, hours)| hours.as_ref().map(|h| (*day, h)))
    }
}

fn index_of(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}
