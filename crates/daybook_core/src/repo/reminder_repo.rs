//! Reminder store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD + get-all-active APIs over persisted reminder
//!   definitions.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `ReminderDefinition::validate()` before SQL mutations.
//! - `time_of_day` is persisted as `HH:MM`; a corrupt value is rejected.
//! - `active_days` decodes fail-open: a corrupt value becomes "every day"
//!   and is logged, never an error.

use crate::model::reminder::{ActiveDays, ReminderDefinition, ReminderId};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use chrono::NaiveTime;
use log::warn;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const REMINDER_SELECT_SQL: &str = "SELECT
    uuid,
    label,
    time_of_day,
    active_days,
    is_active,
    fallback_enabled
FROM reminders";

pub(crate) const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Store interface for reminder definition CRUD.
pub trait ReminderStore: Send + Sync {
    fn create_reminder(&self, def: &ReminderDefinition) -> RepoResult<ReminderId>;
    fn update_reminder(&self, def: &ReminderDefinition) -> RepoResult<()>;
    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<ReminderDefinition>>;
    /// All persisted definitions, active or not. Reconciliation uses this
    /// to also clear wakeups of toggled-off reminders.
    fn list_all_reminders(&self) -> RepoResult<Vec<ReminderDefinition>>;
    fn list_active_reminders(&self) -> RepoResult<Vec<ReminderDefinition>>;
    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()>;
}

/// SQLite-backed reminder store over a shared connection.
pub struct SqliteReminderStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReminderStore {
    /// Constructs a store from a migrated/ready shared connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
    }
}

impl ReminderStore for SqliteReminderStore {
    fn create_reminder(&self, def: &ReminderDefinition) -> RepoResult<ReminderId> {
        def.validate()?;

        self.conn()?.execute(
            "INSERT INTO reminders (
                uuid,
                label,
                time_of_day,
                active_days,
                is_active,
                fallback_enabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                def.id.to_string(),
                def.label.as_str(),
                def.time_of_day.format(TIME_OF_DAY_FORMAT).to_string(),
                def.active_days.to_db(),
                bool_to_int(def.is_active),
                bool_to_int(def.fallback_enabled),
            ],
        )?;

        Ok(def.id)
    }

    fn update_reminder(&self, def: &ReminderDefinition) -> RepoResult<()> {
        def.validate()?;

        let changed = self.conn()?.execute(
            "UPDATE reminders
             SET
                label = ?1,
                time_of_day = ?2,
                active_days = ?3,
                is_active = ?4,
                fallback_enabled = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                def.label.as_str(),
                def.time_of_day.format(TIME_OF_DAY_FORMAT).to_string(),
                def.active_days.to_db(),
                bool_to_int(def.is_active),
                bool_to_int(def.fallback_enabled),
                def.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(def.id));
        }

        Ok(())
    }

    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<ReminderDefinition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{REMINDER_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reminder_row(row)?));
        }

        Ok(None)
    }

    fn list_all_reminders(&self) -> RepoResult<Vec<ReminderDefinition>> {
        self.list_where("")
    }

    fn list_active_reminders(&self) -> RepoResult<Vec<ReminderDefinition>> {
        self.list_where(" WHERE is_active = 1")
    }

    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()> {
        let changed = self
            .conn()?
            .execute("DELETE FROM reminders WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

impl SqliteReminderStore {
    fn list_where(&self, filter: &str) -> RepoResult<Vec<ReminderDefinition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{REMINDER_SELECT_SQL}{filter} ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();
        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }

        Ok(reminders)
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<ReminderDefinition> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "reminders.uuid")?;

    let time_text: String = row.get("time_of_day")?;
    let time_of_day = parse_time_of_day(&time_text, "reminders.time_of_day")?;

    let days_text: String = row.get("active_days")?;
    let active_days = decode_active_days(&days_text, &uuid_text);

    Ok(ReminderDefinition {
        id,
        label: row.get("label")?,
        time_of_day,
        active_days,
        is_active: int_to_bool(row.get("is_active")?, "reminders.is_active")?,
        fallback_enabled: int_to_bool(row.get("fallback_enabled")?, "reminders.fallback_enabled")?,
    })
}

pub(crate) fn parse_time_of_day(value: &str, column: &str) -> RepoResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_OF_DAY_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid time value `{value}` in {column}")))
}

/// Decodes a persisted day selection, failing open to every day.
///
/// The asymmetry with the strict `time_of_day` parse is intentional: a
/// reminder with a corrupt day set keeps firing (daily) instead of going
/// dark.
pub(crate) fn decode_active_days(value: &str, owner: &str) -> ActiveDays {
    match ActiveDays::from_db(value) {
        Some(days) => days,
        None => {
            warn!(
                "event=day_set_decode module=repo status=fail_open owner={owner} raw_len={}",
                value.len()
            );
            ActiveDays::every_day()
        }
    }
}
