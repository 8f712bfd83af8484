//! Engine configuration.
//!
//! Each [`Availability`](crate::Availability) owns one `EngineConfig`; there is
//! no process-wide state. The config deserializes from camelCase JSON so it
//! can be embedded in scenario files.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// Slot length in whole minutes. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "u32")]
pub struct Interval(u32);

impl Interval {
    pub const DEFAULT_MINUTES: u32 = 60;

    /// Build an interval, rejecting zero.
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(AvailabilityError::InvalidInterval(
                "interval must be at least one minute".to_string(),
            ));
        }
        Ok(Interval(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval(Self::DEFAULT_MINUTES)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl From<Interval> for u32 {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

impl TryFrom<u32> for Interval {
    type Error = AvailabilityError;

    fn try_from(minutes: u32) -> Result<Self> {
        Interval::new(minutes)
    }
}

impl TryFrom<i64> for Interval {
    type Error = AvailabilityError;

    fn try_from(minutes: i64) -> Result<Self> {
        let minutes = u32::try_from(minutes)
            .map_err(|_| AvailabilityError::InvalidInterval(minutes.to_string()))?;
        Interval::new(minutes)
    }
}

impl TryFrom<i32> for Interval {
    type Error = AvailabilityError;

    fn try_from(minutes: i32) -> Result<Self> {
        Interval::try_from(i64::from(minutes))
    }
}

impl FromStr for Interval {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self> {
        let minutes: i64 = s
            .trim()
            .parse()
            .map_err(|_| AvailabilityError::InvalidInterval(format!("'{}' is not numeric", s)))?;
        Interval::try_from(minutes)
    }
}

impl TryFrom<&str> for Interval {
    type Error = AvailabilityError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl TryFrom<String> for Interval {
    type Error = AvailabilityError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Intervals in JSON may be numbers or numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Number(i64),
    Text(String),
}

impl TryFrom<RawInterval> for Interval {
    type Error = AvailabilityError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        match raw {
            RawInterval::Number(n) => Interval::try_from(n),
            RawInterval::Text(s) => s.parse(),
        }
    }
}

/// Settings owned by one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Reference timezone: every bucket key is computed here.
    pub time_zone: Tz,
    /// Slot length.
    pub interval: Interval,
    /// Emit blocked slots (annotated) instead of omitting them.
    pub include_unavailable: bool,
}

impl EngineConfig {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::UTC,
            interval: Interval::default(),
            include_unavailable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_parses_numeric_strings_only() {
        assert_eq!("15".parse::<Interval>().unwrap().minutes(), 15);
        assert_eq!(" 30 ".parse::<Interval>().unwrap().minutes(), 30);
        assert!(matches!(
            "abc".parse::<Interval>(),
            Err(AvailabilityError::InvalidInterval(_))
        ));
        assert!("15.5".parse::<Interval>().is_err());
    }

    #[test]
    fn interval_rejects_non_positive() {
        assert!(Interval::new(0).is_err());
        assert!(Interval::try_from(-15i64).is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"timeZone":"US/Pacific","interval":"15"}"#).unwrap();
        assert_eq!(config.time_zone, chrono_tz::US::Pacific);
        assert_eq!(config.interval.minutes(), 15);
        assert!(!config.include_unavailable);
    }

    #[test]
    fn config_rejects_bad_interval() {
        let result = serde_json::from_str::<EngineConfig>(r#"{"interval":"abc"}"#);
        assert!(result.is_err());
    }
}
