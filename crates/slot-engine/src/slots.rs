//! Slot generation -- walk a date range and emit bookable slots per day.
//!
//! For every calendar day the generator lays a grid of `interval`-minute
//! slots over the day's operating hours and checks each slot against the
//! unavailability index at its first instant, its last second, and anywhere
//! in between. Blocked slots are dropped, or kept and annotated when the
//! engine is configured to include them.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dst;
use crate::hours::RegularHours;
use crate::index::{BlockedInterval, UnavailabilityIndex};
use crate::normalize::DateKey;

/// Date key → slots of that day, in chronological order.
pub type DailySlots = BTreeMap<DateKey, Vec<Slot>>;

/// Per-call generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// Lay the grid over the whole day (`00:00:00`–`23:59:59`) and flag the
    /// regular window with `is_scheduled_time`.
    pub include_full_day: bool,
    /// Attach `start_date`/`end_date` instants to each slot.
    pub dates: bool,
    /// Attach `next_unavailable_at` to each slot.
    #[serde(alias = "availableUntil")]
    pub next_unavailable_at: bool,
    /// Timezone for the day walk and slot labels; defaults to the engine's.
    pub time_zone: Option<Tz>,
}

/// One slot of a day's grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Wall-clock start, `HH:mm`.
    pub start: String,
    /// Wall-clock end, `HH:mm`.
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<FixedOffset>>,
    /// Blocks overlapping the slot, one entry per block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<Vec<BlockedInterval>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_unavailable_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_scheduled_time: Option<bool>,
}

impl Slot {
    pub fn is_blocked(&self) -> bool {
        self.unavailable.as_ref().is_some_and(|u| !u.is_empty())
    }
}

/// Generate slots for every day whose local midnight falls in `[start, end)`.
///
/// `start` and `end` must already be expressed in the walk timezone
/// (`options.time_zone`, falling back to `config.time_zone`). Days with no
/// regular hours, and days where every slot was dropped, get no entry.
pub fn generate(
    hours: &RegularHours,
    index: &UnavailabilityIndex,
    config: &EngineConfig,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    options: &GenerateOptions,
) -> DailySlots {
    let tz = options.time_zone.unwrap_or(config.time_zone);
    let walk = DayWalk {
        hours,
        index,
        config,
        options,
        tz,
    };

    let mut result = DailySlots::new();
    let mut date = start.with_timezone(&tz).date_naive();
    loop {
        let midnight = dst::resolve_local(&tz, date.and_time(NaiveTime::MIN));
        if midnight >= *end {
            break;
        }
        let slots = walk.day(date);
        if !slots.is_empty() {
            result.insert(date, slots);
        }
        // One step per calendar day, independent of where the cursor ended.
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    tracing::debug!(
        tz = %tz,
        interval = %config.interval,
        days = result.len(),
        "generated availability"
    );
    result
}

/// `[open, close)` of the grid; `scheduled` is the regular window, if any.
struct DayBounds {
    open: DateTime<Tz>,
    close: DateTime<Tz>,
    scheduled: Option<(DateTime<Tz>, DateTime<Tz>)>,
}

struct DayWalk<'a> {
    hours: &'a RegularHours,
    index: &'a UnavailabilityIndex,
    config: &'a EngineConfig,
    options: &'a GenerateOptions,
    tz: Tz,
}

impl DayWalk<'_> {
    fn at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
        dst::resolve_local(&self.tz, date.and_time(time))
    }

    /// The day's grid bounds, or `None` when the day has no hours.
    fn bounds(&self, date: NaiveDate) -> Option<DayBounds> {
        let scheduled = self
            .hours
            .get(date.weekday())
            .map(|h| (self.at(date, h.start), self.at(date, h.end)));

        if self.options.include_full_day {
            let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
            Some(DayBounds {
                open: self.at(date, NaiveTime::MIN),
                close: self.at(date, last_second) + Duration::seconds(1),
                scheduled,
            })
        } else {
            scheduled.map(|(open, close)| DayBounds {
                open,
                close,
                scheduled: Some((open, close)),
            })
        }
    }

    fn day(&self, date: NaiveDate) -> Vec<Slot> {
        let Some(DayBounds {
            open,
            close,
            scheduled,
        }) = self.bounds(date)
        else {
            return Vec::new();
        };

        let step = self.config.interval.duration();
        let include_unavailable = self.config.include_unavailable;
        let mut onsets = OnsetTracker::default();
        let mut slots: Vec<Slot> = Vec::new();
        let mut cursor = open;

        while cursor < close {
            let slot_start = cursor;
            let slot_end = slot_start + step;
            if slot_end > close {
                break;
            }

            let is_scheduled_time = self.options.include_full_day.then(|| {
                scheduled
                    .as_ref()
                    .is_some_and(|(from, to)| *from <= slot_start && slot_start < *to)
            });

            let mut unavailable = Vec::new();
            let head = self.index.query_at(&slot_start);
            if !head.is_empty() {
                onsets.observe(&head, &mut slots);
                if !include_unavailable {
                    cursor = slot_end;
                    continue;
                }
                unavailable.extend(head);
            }

            cursor = slot_end;

            // Tail and interior overlaps: the slot's last second first, then
            // anything that starts and ends strictly inside the slot.
            let mut rest = self.index.query_at(&(slot_end - Duration::seconds(1)));
            rest.extend(self.index.query_between(&slot_start, &slot_end));
            let rest = dedup_by_id(rest);
            let mut next_unavailable_at = None;
            if !rest.is_empty() {
                next_unavailable_at = onsets.observe(&rest, &mut slots);
                if !include_unavailable {
                    continue;
                }
                unavailable.extend(rest);
            }

            let unavailable = dedup_by_id(unavailable);
            let slot = Slot {
                start: slot_start.format("%H:%M").to_string(),
                end: slot_end.format("%H:%M").to_string(),
                start_date: self.options.dates.then(|| slot_start.fixed_offset()),
                end_date: self.options.dates.then(|| slot_end.fixed_offset()),
                unavailable: (!unavailable.is_empty()).then_some(unavailable),
                next_unavailable_at: if self.options.next_unavailable_at {
                    next_unavailable_at
                } else {
                    None
                },
                is_scheduled_time,
            };
            if self.options.next_unavailable_at && slot.next_unavailable_at.is_none() {
                onsets.pending.push(slots.len());
            }
            slots.push(slot);
        }

        tracing::trace!(date = %date, slots = slots.len(), "generated day");
        slots
    }
}

/// Tracks the first sighting of each block id during one day's walk.
#[derive(Default)]
struct OnsetTracker {
    seen: HashSet<u64>,
    /// Slots still waiting for the next onset.
    pending: Vec<usize>,
}

impl OnsetTracker {
    /// Record `blocks`; if any of them is new, stamp the earliest new start
    /// onto every pending slot and return it.
    fn observe(
        &mut self,
        blocks: &[BlockedInterval],
        slots: &mut [Slot],
    ) -> Option<DateTime<FixedOffset>> {
        let mut onset: Option<DateTime<FixedOffset>> = None;
        for block in blocks {
            if self.seen.insert(block.id) {
                onset = Some(onset.map_or(block.start, |at| at.min(block.start)));
            }
        }
        if let Some(at) = onset {
            for i in self.pending.drain(..) {
                if let Some(slot) = slots.get_mut(i) {
                    slot.next_unavailable_at = Some(at);
                }
            }
        }
        onset
    }
}

/// Keep the first chunk of each block id, preserving order.
fn dedup_by_id(blocks: Vec<BlockedInterval>) -> Vec<BlockedInterval> {
    let mut seen = HashSet::new();
    blocks.into_iter().filter(|b| seen.insert(b.id)).collect()
}
