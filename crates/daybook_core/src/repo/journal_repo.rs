//! Journal entry queries consumed by the fallback verifier.
//!
//! # Responsibility
//! - Expose the "has the user written in this window" count query.
//! - Derive the current writing streak from persisted entries.
//!
//! # Invariants
//! - `count_entries_in_range` is a point-in-time consistent count over the
//!   half-open `[start_ms, end_ms)` window, not an approximation.
//! - This subsystem never mutates entries; `append_entry` exists for the
//!   composing application and tests.

use crate::clock::{day_bounds_on, Clock};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Stable identifier for a journal entry.
pub type EntryId = Uuid;

/// Read-only count of journal entries in a time window.
pub trait EntryStore: Send + Sync {
    /// Number of entries created in `[start_ms, end_ms)` (epoch millis).
    fn count_entries_in_range(&self, start_ms: i64, end_ms: i64) -> RepoResult<u32>;
}

/// Current consecutive-day writing streak. May fail; callers must degrade
/// a failure to streak 0 instead of aborting.
pub trait StreakSource: Send + Sync {
    fn current_streak(&self) -> RepoResult<u32>;
}

/// SQLite-backed journal entry queries over a shared connection.
pub struct SqliteJournalStore {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl SqliteJournalStore {
    /// Constructs a store from a migrated/ready shared connection.
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
    }

    /// Appends one journal entry stamped "now". Not part of the scheduling
    /// surface; used by the composing application and tests.
    pub fn append_entry(&self, content: &str) -> RepoResult<EntryId> {
        let id = Uuid::new_v4();
        self.conn()?.execute(
            "INSERT INTO entries (uuid, content, created_at) VALUES (?1, ?2, ?3);",
            params![
                id.to_string(),
                content,
                self.clock.now().timestamp_millis()
            ],
        )?;
        Ok(id)
    }

    fn count_on_day(&self, date: chrono::NaiveDate) -> RepoResult<u32> {
        let (start_ms, end_ms) = day_bounds_on(date, *self.clock.now().offset());
        self.count_entries_in_range(start_ms, end_ms)
    }
}

impl EntryStore for SqliteJournalStore {
    fn count_entries_in_range(&self, start_ms: i64, end_ms: i64) -> RepoResult<u32> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM entries WHERE created_at >= ?1 AND created_at < ?2;",
            params![start_ms, end_ms],
            |row| row.get(0),
        )?;
        u32::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative entry count {count}")))
    }
}

impl StreakSource for SqliteJournalStore {
    /// Consecutive days with at least one entry, counted backwards from
    /// today. A streak kept alive through yesterday still counts even if
    /// nothing has been written yet today.
    fn current_streak(&self) -> RepoResult<u32> {
        let today = self.clock.now().date_naive();

        let mut day = today;
        if self.count_on_day(day)? == 0 {
            let Some(yesterday) = day.pred_opt() else {
                return Ok(0);
            };
            if self.count_on_day(yesterday)? == 0 {
                return Ok(0);
            }
            day = yesterday;
        }

        let mut streak = 0u32;
        while self.count_on_day(day)? > 0 {
            streak = streak.saturating_add(1);
            match day.pred_opt() {
                Some(previous) => day = previous,
                None => break,
            }
        }

        Ok(streak)
    }
}
