//! Goal check-in definition model.
//!
//! # Responsibility
//! - Define `GoalDefinition`, the persisted record behind goal check-in
//!   reminders.
//!
//! # Invariants
//! - `title` is rendered verbatim in the check-in notification body.
//! - Goals share reminder day-selection semantics but have no fallback.

use crate::model::reminder::{ActiveDays, ReminderValidationError, MAX_LABEL_CHARS};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a goal.
pub type GoalId = Uuid;

/// Persisted definition of one recurring goal check-in reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDefinition {
    /// Stable global ID, immutable for the lifetime of the goal.
    pub id: GoalId,
    /// Goal title, rendered verbatim in the notification body.
    pub title: String,
    /// Local wall-clock check-in time. No date, no zone.
    pub time_of_day: NaiveTime,
    /// Weekdays on which the check-in is allowed to notify.
    pub active_days: ActiveDays,
    /// Inactive goals must have no live wakeup.
    pub is_active: bool,
}

impl GoalDefinition {
    /// Creates an active goal with a generated stable ID.
    pub fn new(title: impl Into<String>, time_of_day: NaiveTime, active_days: ActiveDays) -> Self {
        Self::with_id(Uuid::new_v4(), title, time_of_day, active_days)
    }

    /// Creates a goal with a caller-provided stable ID.
    pub fn with_id(
        id: GoalId,
        title: impl Into<String>,
        time_of_day: NaiveTime,
        active_days: ActiveDays,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            time_of_day,
            active_days,
            is_active: true,
        }
    }

    /// Validates invariants that must hold before persistence.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.active_days.is_empty() {
            return Err(ReminderValidationError::EmptyActiveDays);
        }
        if self.title.chars().count() > MAX_LABEL_CHARS {
            return Err(ReminderValidationError::LabelTooLong {
                max_chars: MAX_LABEL_CHARS,
            });
        }
        Ok(())
    }
}
