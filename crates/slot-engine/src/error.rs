//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid/unsupported date or time value: {0}")]
    InvalidTemporalValue(String),

    #[error("Invalid weekday name: {0}")]
    InvalidWeekdayName(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
