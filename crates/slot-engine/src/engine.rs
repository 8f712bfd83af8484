//! The `Availability` engine: one person's regular hours plus blocked time.
//!
//! Owns an [`EngineConfig`], a [`RegularHours`] table and an
//! [`UnavailabilityIndex`]. Configuration calls chain through `&mut Self`;
//! queries take `&self` and never mutate anything.

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;

use crate::config::{EngineConfig, Interval};
use crate::error::{AvailabilityError, Result};
use crate::hours::{HoursEntry, RegularHours, WeekdayKey};
use crate::index::{Block, BlockedInterval, UnavailabilityIndex};
use crate::normalize::{self, TemporalInput};
use crate::slots::{self, DailySlots, GenerateOptions};

#[derive(Debug, Clone)]
pub struct Availability {
    config: EngineConfig,
    regular_hours: RegularHours,
    unavailable: UnavailabilityIndex,
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}

impl Availability {
    /// An engine in UTC with 60-minute slots.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// An engine with the given settings. The reference timezone is fixed for
    /// the lifetime of the engine since every stored bucket depends on it.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            unavailable: UnavailabilityIndex::new(config.time_zone),
            regular_hours: RegularHours::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time_zone(&self) -> Tz {
        self.config.time_zone
    }

    pub fn interval(&self) -> Interval {
        self.config.interval
    }

    pub fn regular_hours(&self) -> &RegularHours {
        &self.regular_hours
    }

    /// Replace the regular hours table.
    ///
    /// Keys are weekday names (any case) or numbers `0..=6` with `0` =
    /// Sunday; values are `{start, end}` in `HH:mm[:ss]`.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidWeekdayName` or
    /// `AvailabilityError::InvalidTemporalValue`; the previous table is kept.
    pub fn set_regular_hours<K, V, I>(&mut self, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<WeekdayKey>,
        V: Into<HoursEntry>,
    {
        self.regular_hours = RegularHours::from_entries(entries)?;
        Ok(self)
    }

    /// Set the slot length in minutes, from an integer or a numeric string.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidInterval`; the previous interval is
    /// kept.
    pub fn set_interval<T>(&mut self, minutes: T) -> Result<&mut Self>
    where
        T: TryInto<Interval, Error = AvailabilityError>,
    {
        self.config.interval = minutes.try_into()?;
        Ok(self)
    }

    /// Emit blocked slots (annotated with their blocks) instead of omitting
    /// them.
    pub fn set_include_unavailable(&mut self, include: bool) -> &mut Self {
        self.config.include_unavailable = include;
        self
    }

    /// Block `[start, end)`.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn add_unavailable(
        &mut self,
        start: impl Into<TemporalInput>,
        end: impl Into<TemporalInput>,
    ) -> Result<&mut Self> {
        self.add_block(Block::new(start).until(end))
    }

    /// Block from `start` until the end of that calendar day.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn add_unavailable_day(&mut self, start: impl Into<TemporalInput>) -> Result<&mut Self> {
        self.add_block(Block::new(start))
    }

    /// Block `[start, end)` and attach an opaque payload to it.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn add_unavailable_with_details(
        &mut self,
        start: impl Into<TemporalInput>,
        end: impl Into<TemporalInput>,
        details: impl Into<Value>,
    ) -> Result<&mut Self> {
        self.add_block(Block::new(start).until(end).details(details))
    }

    /// Insert a fully described block.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn add_block(&mut self, block: Block) -> Result<&mut Self> {
        self.unavailable.insert(&block)?;
        Ok(self)
    }

    /// Whether any block contains `instant`.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn is_unavailable_at(&self, instant: impl Into<TemporalInput>) -> Result<bool> {
        Ok(!self.unavailable_at(instant)?.is_empty())
    }

    /// Every block chunk containing `instant`.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn unavailable_at(
        &self,
        instant: impl Into<TemporalInput>,
    ) -> Result<Vec<BlockedInterval>> {
        let instant = self.normalize(instant)?;
        Ok(self.unavailable.query_at(&instant))
    }

    /// Slots per day for every day in `[start, end)`.
    ///
    /// Plain dates and wall-clock strings are read in `options.time_zone`
    /// when set, otherwise in the engine's reference timezone.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` for unparseable input.
    pub fn get_availability(
        &self,
        start: impl Into<TemporalInput>,
        end: impl Into<TemporalInput>,
        options: &GenerateOptions,
    ) -> Result<DailySlots> {
        let tz = options.time_zone.unwrap_or(self.config.time_zone);
        let start = normalize::normalize(start, &tz)?;
        let end = normalize::normalize(end, &tz)?;
        Ok(slots::generate(
            &self.regular_hours,
            &self.unavailable,
            &self.config,
            &start,
            &end,
            options,
        ))
    }

    /// Read-only view of the unavailability index.
    pub fn unavailable(&self) -> &UnavailabilityIndex {
        &self.unavailable
    }

    fn normalize(&self, input: impl Into<TemporalInput>) -> Result<DateTime<Tz>> {
        normalize::normalize(input, &self.config.time_zone)
    }
}
