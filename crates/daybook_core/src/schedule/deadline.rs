//! Deadline derivation for recurring local wall-clock times.
//!
//! # Responsibility
//! - Compute the next absolute fire instant for a `time_of_day`, rolling
//!   forward by calendar days (never raw 24-hour jumps).
//! - Compute the dependent fallback instant, fixed at 30 minutes after the
//!   owning reminder.
//!
//! # Invariants
//! - Every returned instant is strictly later than `now`.
//! - The fallback instant is strictly later than its owning occurrence.
//! - A nonexistent local time (spring-forward gap) resolves to the first
//!   valid instant after it; an ambiguous one (fall-back) resolves to the
//!   earliest mapping.

use crate::model::reminder::ActiveDays;
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};

/// Minutes between a writing reminder and its fallback check.
pub const FALLBACK_OFFSET_MINUTES: i64 = 30;

/// Next instant at `time_of_day` in `now`'s zone, any weekday.
///
/// Today's instant when it is still ahead, otherwise the next calendar
/// day's.
pub fn next_fire_time<Tz: TimeZone>(time_of_day: NaiveTime, now: &DateTime<Tz>) -> DateTime<Tz> {
    next_occurrence(time_of_day, ActiveDays::every_day(), now)
        .unwrap_or_else(|| now.clone() + Duration::days(1))
}

/// Next instant at `time_of_day` falling on an active weekday.
///
/// Returns `None` only for an empty day selection, which valid persisted
/// definitions never carry.
pub fn next_occurrence<Tz: TimeZone>(
    time_of_day: NaiveTime,
    active_days: ActiveDays,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    if active_days.is_empty() {
        return None;
    }

    let tz = now.timezone();
    let mut date = now.date_naive();
    // Eight dates cover today plus a full week of inactive days.
    for _ in 0..=7 {
        if active_days.contains(date.weekday()) {
            if let Some(candidate) = resolve_local(&tz, date, time_of_day) {
                if candidate > *now {
                    return Some(candidate);
                }
            }
        }
        date = date.succ_opt()?;
    }

    None
}

/// Next fallback instant: the owning reminder's next occurrence plus the
/// fixed offset, rolled forward a day while not strictly in the future.
pub fn next_fallback_occurrence<Tz: TimeZone>(
    time_of_day: NaiveTime,
    active_days: ActiveDays,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let owner = next_occurrence(time_of_day, active_days, now)?;
    let mut candidate = owner + Duration::minutes(FALLBACK_OFFSET_MINUTES);
    while candidate <= *now {
        candidate = candidate + Duration::days(1);
    }
    Some(candidate)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    for skip_hours in 0..3i64 {
        let naive = date.and_time(time) + Duration::hours(skip_hours);
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(instant) => return Some(instant),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest),
            LocalResult::None => continue,
        }
    }
    None
}
