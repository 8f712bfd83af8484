//! # slot-engine
//!
//! Timezone-correct availability slots from regular hours and blocked time.
//!
//! Give the engine a weekly table of operating hours and any number of
//! blocked intervals (appointments, holidays, out-of-office days); ask it for
//! a date range and it returns, per day, the grid of bookable slots at the
//! configured granularity. Blocked slots are omitted, or kept and annotated
//! with the blocks that hit them.
//!
//! ```rust
//! use slot_engine::{Availability, GenerateOptions};
//!
//! let mut av = Availability::new();
//! av.set_regular_hours([("monday", ("09:00", "12:00"))])
//!     .unwrap()
//!     .add_unavailable("2016-06-20 10:00", "2016-06-20 11:00")
//!     .unwrap();
//!
//! let days = av
//!     .get_availability("2016-06-20", "2016-06-21", &GenerateOptions::default())
//!     .unwrap();
//! let starts: Vec<&str> = days.values().next().unwrap().iter().map(|s| s.start.as_str()).collect();
//! assert_eq!(starts, ["09:00", "11:00"]);
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: `Availability`, the facade owning config, hours and blocks
//! - [`hours`]: weekday → operating hours table
//! - [`index`]: date → hour → blocked intervals
//! - [`slots`]: the per-day slot generator
//! - [`normalize`]: external date/time values → zoned instants
//! - [`dst`]: wall-clock arithmetic across DST folds and gaps
//! - [`config`]: `EngineConfig` and `Interval`
//! - [`error`]: Error types

pub mod config;
pub mod dst;
pub mod engine;
pub mod error;
pub mod hours;
pub mod index;
pub mod normalize;
pub mod slots;

pub use config::{EngineConfig, Interval};
pub use engine::Availability;
pub use error::{AvailabilityError, Result};
pub use hours::{HoursEntry, OperatingHours, RegularHours, WeekdayKey};
pub use index::{Block, BlockedInterval, UnavailabilityIndex};
pub use normalize::{normalize, parse_timezone, DateKey, HourKey, TemporalInput};
pub use slots::{generate, DailySlots, GenerateOptions, Slot};
