//! Wall-clock arithmetic across DST transitions.
//!
//! Every bucket key and every slot label is a local wall-clock value, but all
//! cursors advance in absolute time. The helpers here translate between the
//! two without panicking on folds (a repeated hour) or gaps (a skipped hour).

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Timelike};
use chrono_tz::Tz;

/// Longest local-time jump observed in the tz database (Lord Howe uses 30
/// minutes, most zones 1 hour, a handful of historical changes 2 hours).
const MAX_TRANSITION_HOURS: i64 = 3;

/// Resolve a local wall-clock value in `tz` to an instant.
///
/// - Ambiguous values (fold) resolve to the earlier instant.
/// - Non-existent values (gap) shift forward by the gap length, so 02:30 on a
///   spring-forward night in `America/New_York` becomes 03:30 EDT.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => shift_over_gap(tz, local),
    }
}

/// Interpret `local` with the offset in effect just before the gap.
fn shift_over_gap(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    for hours in 1..=MAX_TRANSITION_HOURS {
        let probe = local - Duration::hours(hours);
        let before = match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(_, latest) => latest,
            LocalResult::None => continue,
        };
        let offset = before.offset().fix().local_minus_utc();
        let utc = local - Duration::seconds(i64::from(offset));
        return tz.from_utc_datetime(&utc);
    }
    tz.from_utc_datetime(&local)
}

/// The start of the wall-clock hour containing `instant`.
pub fn truncate_to_hour(instant: &DateTime<Tz>) -> DateTime<Tz> {
    instant.clone()
        - Duration::minutes(i64::from(instant.minute()))
        - Duration::seconds(i64::from(instant.second()))
        - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

/// The first instant after `hour_start` whose wall-clock value is later.
///
/// Advancing one hour normally moves the wall clock forward by one hour (or
/// more across a gap). Inside a fold it lands on the same wall-clock hour
/// again; the cursor then keeps moving until the wall clock strictly
/// increases, which is two hours for an ordinary one-hour fold.
pub fn next_wall_clock_hour(hour_start: &DateTime<Tz>) -> DateTime<Tz> {
    let wall = hour_start.naive_local();
    let mut next = hour_start.clone() + Duration::hours(1);
    for _ in 0..MAX_TRANSITION_HOURS {
        if next.naive_local() > wall {
            break;
        }
        next = next + Duration::hours(1);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::America::New_York;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn gap_shifts_forward() {
        // 2016-03-13 02:30 does not exist in New York.
        let dt = resolve_local(&New_York, local(2016, 3, 13, 2, 30));
        assert_eq!(dt.naive_local(), local(2016, 3, 13, 3, 30));
    }

    #[test]
    fn fold_resolves_to_earliest() {
        let dt = resolve_local(&New_York, local(2016, 11, 6, 1, 30));
        assert_eq!(dt.offset().fix().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn truncation_keeps_wall_clock_hour() {
        let dt = resolve_local(&New_York, local(2016, 6, 21, 13, 47));
        assert_eq!(truncate_to_hour(&dt).naive_local(), local(2016, 6, 21, 13, 0));
    }

    #[test]
    fn fold_advances_two_hours() {
        let first_one_am = resolve_local(&New_York, local(2016, 11, 6, 1, 0));
        let next = next_wall_clock_hour(&first_one_am);
        assert_eq!(next.naive_local(), local(2016, 11, 6, 2, 0));
        assert_eq!(next - first_one_am, Duration::hours(2));
    }

    #[test]
    fn gap_advances_one_hour() {
        let one_am = resolve_local(&New_York, local(2016, 3, 13, 1, 0));
        let next = next_wall_clock_hour(&one_am);
        assert_eq!(next.naive_local(), local(2016, 3, 13, 3, 0));
        assert_eq!(next - one_am, Duration::hours(1));
    }
}
