//! Calendar-day boundary detection.
//!
//! Day comparisons are calendar-date based in local time, never elapsed
//! milliseconds: 23 hours later on the same date is not a new day, while
//! one minute past midnight is.

use chrono::{DateTime, Local, LocalResult, TimeZone, Utc};

/// True iff `now` falls on a strictly later local calendar date
/// than `last_reset`.
pub fn is_new_day(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.with_timezone(&Local).date_naive() > last_reset.with_timezone(&Local).date_naive()
}

/// Midnight at the start of `now`'s local calendar date, expressed in UTC.
///
/// Falls back to `now` itself if local midnight does not exist on that
/// date (a DST gap at midnight).
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.with_timezone(&Local).date_naive();
    match date.and_hms_opt(0, 0, 0) {
        Some(naive) => match naive.and_local_timezone(Local) {
            LocalResult::Single(midnight) => midnight.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => now,
        },
        None => now,
    }
}

/// Whole days elapsed between two instants (floor of the elapsed duration).
pub fn full_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_days()
}
