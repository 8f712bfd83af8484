//! The unavailability index: calendar date → hour of day → blocked intervals.
//!
//! Each inserted block is cut into hour-aligned chunks, and every chunk is
//! stored under the `(date, hour)` bucket it overlaps in the reference
//! timezone. Point queries then only ever look at one bucket.
//!
//! Chunks of the same block share an id. Nothing is merged by time range:
//! overlapping blocks simply sit side by side in a bucket, except that a chunk
//! covering a whole hour replaces whatever the bucket held before.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::dst;
use crate::error::Result;
use crate::normalize::{self, DateKey, HourKey, TemporalInput};

/// Chunks ending within this much of the end of their hour count as filling
/// it, so both `hh:59:59` and the end-of-day value `23:59:59.999` cover the
/// hour.
const WHOLE_HOUR_TOLERANCE_SECS: i64 = 1;

/// One hour-bounded piece of a caller-declared block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockedInterval {
    /// Shared by every chunk of the same block.
    pub id: u64,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Opaque caller payload, returned verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl BlockedInterval {
    /// Closed-open containment: `start <= instant < end`.
    pub fn contains<T: TimeZone>(&self, instant: &DateTime<T>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    /// Whether `[start, end)` shares any instant with this chunk.
    pub fn overlaps<T: TimeZone>(&self, start: &DateTime<T>, end: &DateTime<T>) -> bool {
        self.start < *end && *start < self.end
    }
}

/// A block to insert: `end` defaults to the end of `start`'s day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    pub start: TemporalInput,
    #[serde(default)]
    pub end: Option<TemporalInput>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl Block {
    /// A block from `start` until the end of that calendar day.
    pub fn new(start: impl Into<TemporalInput>) -> Self {
        Self {
            start: start.into(),
            end: None,
            details: None,
        }
    }

    pub fn until(mut self, end: impl Into<TemporalInput>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type Buckets = BTreeMap<DateKey, BTreeMap<HourKey, Vec<BlockedInterval>>>;

/// Blocked time bucketed by `(date, hour)` in a fixed reference timezone.
#[derive(Debug, Clone)]
pub struct UnavailabilityIndex {
    time_zone: Tz,
    last_id: u64,
    buckets: Buckets,
}

impl UnavailabilityIndex {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            last_id: 0,
            buckets: BTreeMap::new(),
        }
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Insert a block and return its id.
    ///
    /// `[start, end)` is cut at every wall-clock hour boundary of the reference
    /// timezone. A block whose end is not after its start stores nothing but
    /// still consumes an id.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTemporalValue` if `start` or `end`
    /// cannot be parsed; the index is left untouched.
    pub fn insert(&mut self, block: &Block) -> Result<u64> {
        let start = normalize::normalize(&block.start, &self.time_zone)?;
        let end = match &block.end {
            Some(end) => normalize::normalize(end, &self.time_zone)?,
            None => normalize::end_of_day(&start),
        };

        self.last_id += 1;
        let id = self.last_id;

        let mut cursor = start;
        let mut chunks = 0usize;
        while cursor < end {
            let hour_start = dst::truncate_to_hour(&cursor);
            let hour_end = dst::next_wall_clock_hour(&hour_start);
            let chunk_end = hour_end.min(end);
            let whole_hour = cursor == hour_start
                && hour_end - chunk_end <= Duration::seconds(WHOLE_HOUR_TOLERANCE_SECS);

            let (date_key, hour_key) = normalize::bucket_key(&cursor, &self.time_zone);
            let bucket = self
                .buckets
                .entry(date_key)
                .or_default()
                .entry(hour_key)
                .or_default();
            if whole_hour {
                bucket.clear();
            }
            bucket.push(BlockedInterval {
                id,
                start: cursor.fixed_offset(),
                end: chunk_end.fixed_offset(),
                details: block.details.clone(),
            });

            chunks += 1;
            cursor = hour_end;
        }

        tracing::debug!(
            id,
            start = %start.to_rfc3339(),
            end = %end.to_rfc3339(),
            chunks,
            "inserted blocked interval"
        );
        Ok(id)
    }

    /// Every chunk containing `instant`, in insertion order.
    pub fn query_at<T: TimeZone>(&self, instant: &DateTime<T>) -> Vec<BlockedInterval> {
        let (date_key, hour_key) = normalize::bucket_key(instant, &self.time_zone);
        self.bucket(date_key, hour_key)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|b| b.contains(instant))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_blocked_at<T: TimeZone>(&self, instant: &DateTime<T>) -> bool {
        !self.query_at(instant).is_empty()
    }

    /// Chunks overlapping `[start, end)`, first chunk per block id only.
    ///
    /// Walks every hour bucket the range touches in the reference timezone.
    pub fn query_between<T: TimeZone>(
        &self,
        start: &DateTime<T>,
        end: &DateTime<T>,
    ) -> Vec<BlockedInterval> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let end_local = end.with_timezone(&self.time_zone);
        let mut cursor = start.with_timezone(&self.time_zone);
        while cursor < end_local {
            let (date_key, hour_key) = normalize::bucket_key(&cursor, &self.time_zone);
            if let Some(bucket) = self.bucket(date_key, hour_key) {
                for b in bucket {
                    if b.overlaps(start, end) && seen.insert(b.id) {
                        found.push(b.clone());
                    }
                }
            }
            cursor = dst::next_wall_clock_hour(&dst::truncate_to_hour(&cursor));
        }
        found
    }

    /// The raw bucket for `(date, hour)`, if anything was ever stored there.
    pub fn bucket(&self, date: DateKey, hour: HourKey) -> Option<&[BlockedInterval]> {
        self.buckets
            .get(&date)
            .and_then(|hours| hours.get(&hour))
            .map(Vec::as_slice)
    }

    /// Read-only view of the whole index.
    pub fn buckets(&self) -> &BTreeMap<DateKey, BTreeMap<HourKey, Vec<BlockedInterval>>> {
        &self.buckets
    }

    /// Hour buckets stored for `date`.
    pub fn hours_on(&self, date: DateKey) -> Option<&BTreeMap<HourKey, Vec<BlockedInterval>>> {
        self.buckets.get(&date)
    }

    /// Total number of stored chunks.
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Serialize for UnavailabilityIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.buckets.serialize(serializer)
    }
}
