//! Local time source seam.
//!
//! # Responsibility
//! - Provide "now" as an explicit, injectable capability instead of ambient
//!   `Local::now()` calls scattered through scheduling code.
//! - Provide local-day window arithmetic shared by the fallback verifier
//!   and the streak derivation.
//!
//! # Invariants
//! - `Clock::now` returns local wall-clock time with its UTC offset
//!   attached; deadline math downstream stays zone-generic.
//! - Day windows are half-open: `[start_of_day, start_of_next_day)`.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime};
use std::sync::Mutex;

/// Injectable local-time source.
pub trait Clock: Send + Sync {
    /// Current local time with the current UTC offset attached.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Production clock backed by the device zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually-advanced clock for tests and deterministic replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to a new instant.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Epoch-millisecond bounds of the local day containing `now`, half-open.
pub fn local_day_bounds(now: DateTime<FixedOffset>) -> (i64, i64) {
    day_bounds_on(now.date_naive(), *now.offset())
}

/// Epoch-millisecond bounds of one local calendar day, half-open.
pub fn day_bounds_on(date: NaiveDate, offset: FixedOffset) -> (i64, i64) {
    let midnight = NaiveTime::MIN;
    let start = date
        .and_time(midnight)
        .and_local_timezone(offset)
        .single()
        .map_or(0, |dt| dt.timestamp_millis());
    let next = date
        .succ_opt()
        .unwrap_or(date)
        .and_time(midnight)
        .and_local_timezone(offset)
        .single()
        .map_or(start, |dt| dt.timestamp_millis());
    (start, next)
}
