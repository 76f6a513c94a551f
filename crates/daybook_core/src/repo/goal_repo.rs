//! Goal store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD + get-all-active APIs over persisted goal definitions.
//! - Own idempotent daily check-in recording.
//!
//! # Invariants
//! - `record_check_in` is idempotent per `(goal, local date)`; the second
//!   call for the same pair reports `AlreadyRecorded` and writes nothing.
//! - Deleting a goal cascades to its check-in rows.

use crate::model::goal::{GoalDefinition, GoalId};
use crate::repo::reminder_repo::{decode_active_days, parse_time_of_day, TIME_OF_DAY_FORMAT};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const GOAL_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    time_of_day,
    active_days,
    is_active
FROM goals";

const CHECKIN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of one check-in recording attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// A new check-in row was written.
    Recorded,
    /// A check-in already existed for this `(goal, date)` pair.
    AlreadyRecorded,
}

/// Store interface for goal definition CRUD and check-ins.
pub trait GoalStore: Send + Sync {
    fn create_goal(&self, def: &GoalDefinition) -> RepoResult<GoalId>;
    fn update_goal(&self, def: &GoalDefinition) -> RepoResult<()>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<GoalDefinition>>;
    /// All persisted definitions, active or not.
    fn list_all_goals(&self) -> RepoResult<Vec<GoalDefinition>>;
    fn list_active_goals(&self) -> RepoResult<Vec<GoalDefinition>>;
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
    /// Records a check-in for the given local date. Idempotent.
    fn record_check_in(&self, id: GoalId, date: NaiveDate) -> RepoResult<CheckInOutcome>;
    fn has_check_in(&self, id: GoalId, date: NaiveDate) -> RepoResult<bool>;
}

/// SQLite-backed goal store over a shared connection.
pub struct SqliteGoalStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteGoalStore {
    /// Constructs a store from a migrated/ready shared connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
    }

    fn list_where(&self, filter: &str) -> RepoResult<Vec<GoalDefinition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{GOAL_SELECT_SQL}{filter} ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }

        Ok(goals)
    }
}

impl GoalStore for SqliteGoalStore {
    fn create_goal(&self, def: &GoalDefinition) -> RepoResult<GoalId> {
        def.validate()?;

        self.conn()?.execute(
            "INSERT INTO goals (
                uuid,
                title,
                time_of_day,
                active_days,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                def.id.to_string(),
                def.title.as_str(),
                def.time_of_day.format(TIME_OF_DAY_FORMAT).to_string(),
                def.active_days.to_db(),
                bool_to_int(def.is_active),
            ],
        )?;

        Ok(def.id)
    }

    fn update_goal(&self, def: &GoalDefinition) -> RepoResult<()> {
        def.validate()?;

        let changed = self.conn()?.execute(
            "UPDATE goals
             SET
                title = ?1,
                time_of_day = ?2,
                active_days = ?3,
                is_active = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                def.title.as_str(),
                def.time_of_day.format(TIME_OF_DAY_FORMAT).to_string(),
                def.active_days.to_db(),
                bool_to_int(def.is_active),
                def.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(def.id));
        }

        Ok(())
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<GoalDefinition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{GOAL_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }

        Ok(None)
    }

    fn list_all_goals(&self) -> RepoResult<Vec<GoalDefinition>> {
        self.list_where("")
    }

    fn list_active_goals(&self) -> RepoResult<Vec<GoalDefinition>> {
        self.list_where(" WHERE is_active = 1")
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn()?
            .execute("DELETE FROM goals WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn record_check_in(&self, id: GoalId, date: NaiveDate) -> RepoResult<CheckInOutcome> {
        let changed = self.conn()?.execute(
            "INSERT OR IGNORE INTO goal_checkins (goal_uuid, checkin_date)
             VALUES (?1, ?2);",
            params![id.to_string(), date.format(CHECKIN_DATE_FORMAT).to_string()],
        )?;

        if changed == 0 {
            Ok(CheckInOutcome::AlreadyRecorded)
        } else {
            Ok(CheckInOutcome::Recorded)
        }
    }

    fn has_check_in(&self, id: GoalId, date: NaiveDate) -> RepoResult<bool> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM goal_checkins WHERE goal_uuid = ?1 AND checkin_date = ?2;",
            params![id.to_string(), date.format(CHECKIN_DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<GoalDefinition> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "goals.uuid")?;

    let time_text: String = row.get("time_of_day")?;
    let time_of_day = parse_time_of_day(&time_text, "goals.time_of_day")?;

    let days_text: String = row.get("active_days")?;
    let active_days = decode_active_days(&days_text, &uuid_text);

    Ok(GoalDefinition {
        id,
        title: row.get("title")?,
        time_of_day,
        active_days,
        is_active: int_to_bool(row.get("is_active")?, "goals.is_active")?,
    })
}
