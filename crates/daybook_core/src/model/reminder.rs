//! Writing reminder definition and day-selection model.
//!
//! # Responsibility
//! - Define `ReminderDefinition`, the persisted source of truth every live
//!   wakeup is derived from.
//! - Define `ActiveDays` and its matching/decoding rules.
//!
//! # Invariants
//! - `id` is stable and never reused for another reminder.
//! - `time_of_day` carries no date and no zone; the device zone is applied
//!   at fire-time, not at creation-time.
//! - `ActiveDays::from_db_lossy` fails open: corrupt day selections decode
//!   as every day. A reminder that over-notifies is recoverable; one that
//!   silently goes dark is not.
//!
//! # See also
//! - docs/architecture/reminder-engine.md

use chrono::{NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a writing reminder.
pub type ReminderId = Uuid;

/// Maximum characters accepted for a reminder label.
pub const MAX_LABEL_CHARS: usize = 120;

static DAY_SET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-6](\s*,\s*[0-6])*$").expect("valid day set regex"));

const EVERY_DAY_MASK: u8 = 0b0111_1111;

/// Set of active weekdays, packed as a 7-bit mask (Mon=0 .. Sun=6).
///
/// Serialized as a sorted list of weekday indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ActiveDays(u8);

impl ActiveDays {
    /// Returns the empty selection. Rejected by `validate()`; kept only so
    /// callers can build selections incrementally.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns the selection covering all seven weekdays.
    pub fn every_day() -> Self {
        Self(EVERY_DAY_MASK)
    }

    /// Builds a selection from weekday indices (Mon=0 .. Sun=6).
    pub fn from_indices(indices: &[u8]) -> Result<Self, ActiveDaysError> {
        let mut days = Self::empty();
        for &index in indices {
            if index > 6 {
                return Err(ActiveDaysError::IndexOutOfRange(index));
            }
            days.0 |= 1 << index;
        }
        Ok(days)
    }

    /// Builds a selection from `chrono` weekdays.
    pub fn from_weekdays(weekdays: &[Weekday]) -> Self {
        let mut days = Self::empty();
        for weekday in weekdays {
            days.insert(*weekday);
        }
        days
    }

    /// Adds one weekday to the selection.
    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_monday();
    }

    /// Day matcher: whether the given weekday is in the selection.
    ///
    /// Pure and total. An empty selection matches no weekday.
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sorted weekday indices in the selection.
    pub fn indices(self) -> Vec<u8> {
        (0u8..7).filter(|index| self.0 & (1 << index) != 0).collect()
    }

    /// Encodes the selection for storage as comma-separated indices.
    pub fn to_db(self) -> String {
        self.indices()
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Strictly decodes a persisted day selection.
    ///
    /// Returns `None` for anything that is not a non-empty, well-formed
    /// list of indices in `0..=6`.
    pub fn from_db(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if !DAY_SET_RE.is_match(trimmed) {
            return None;
        }
        let indices: Vec<u8> = trimmed
            .split(',')
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()?;
        Self::from_indices(&indices).ok()
    }

    /// Decodes a persisted day selection, failing open to every day.
    ///
    /// A corrupt selection must over-notify rather than silently never
    /// fire, so every malformed or empty input decodes as all seven days.
    pub fn from_db_lossy(value: &str) -> Self {
        Self::from_db(value).unwrap_or_else(Self::every_day)
    }
}

impl TryFrom<Vec<u8>> for ActiveDays {
    type Error = ActiveDaysError;

    fn try_from(indices: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&indices)
    }
}

impl From<ActiveDays> for Vec<u8> {
    fn from(days: ActiveDays) -> Self {
        days.indices()
    }
}

/// Day-selection construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveDaysError {
    /// Weekday index outside `0..=6`.
    IndexOutOfRange(u8),
}

impl Display for ActiveDaysError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange(index) => {
                write!(f, "weekday index out of range (0..=6): {index}")
            }
        }
    }
}

impl Error for ActiveDaysError {}

/// Persisted definition of one recurring writing reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDefinition {
    /// Stable global ID, immutable for the lifetime of the reminder.
    pub id: ReminderId,
    /// Free-text display label; opaque to the scheduler.
    pub label: String,
    /// Local wall-clock fire time. No date, no zone.
    pub time_of_day: NaiveTime,
    /// Weekdays on which the reminder is allowed to notify.
    pub active_days: ActiveDays,
    /// Inactive reminders must have no live wakeup.
    pub is_active: bool,
    /// When set, a dependent fallback check runs 30 minutes after the
    /// main fire time.
    pub fallback_enabled: bool,
}

impl ReminderDefinition {
    /// Creates an active reminder with a generated stable ID.
    pub fn new(label: impl Into<String>, time_of_day: NaiveTime, active_days: ActiveDays) -> Self {
        Self::with_id(Uuid::new_v4(), label, time_of_day, active_days)
    }

    /// Creates a reminder with a caller-provided stable ID.
    ///
    /// Used by import/restore paths where identity already exists.
    pub fn with_id(
        id: ReminderId,
        label: impl Into<String>,
        time_of_day: NaiveTime,
        active_days: ActiveDays,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            time_of_day,
            active_days,
            is_active: true,
            fallback_enabled: false,
        }
    }

    /// Validates invariants that must hold before persistence.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.active_days.is_empty() {
            return Err(ReminderValidationError::EmptyActiveDays);
        }
        if self.label.chars().count() > MAX_LABEL_CHARS {
            return Err(ReminderValidationError::LabelTooLong {
                max_chars: MAX_LABEL_CHARS,
            });
        }
        Ok(())
    }
}

/// Reminder definition validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderValidationError {
    /// No weekday selected; the reminder could never fire.
    EmptyActiveDays,
    /// Label exceeds the storage cap.
    LabelTooLong { max_chars: usize },
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyActiveDays => {
                write!(f, "active day selection must contain at least one weekday")
            }
            Self::LabelTooLong { max_chars } => {
                write!(f, "label exceeds {max_chars} characters")
            }
        }
    }
}

impl Error for ReminderValidationError {}

#[cfg(test)]
mod tests {
    use super::{ActiveDays, ReminderDefinition, ReminderValidationError, MAX_LABEL_CHARS};
    use chrono::{NaiveTime, Weekday};

    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn eight_am() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).expect("valid time")
    }

    #[test]
    fn contains_matches_exactly_the_selected_days() {
        let days = ActiveDays::from_indices(&[0, 2, 4]).unwrap();
        for weekday in ALL_WEEKDAYS {
            let expected = matches!(weekday, Weekday::Mon | Weekday::Wed | Weekday::Fri);
            assert_eq!(days.contains(weekday), expected, "weekday {weekday}");
        }
    }

    #[test]
    fn empty_selection_matches_no_weekday() {
        let days = ActiveDays::empty();
        for weekday in ALL_WEEKDAYS {
            assert!(!days.contains(weekday));
        }
    }

    #[test]
    fn db_round_trip_preserves_selection() {
        let days = ActiveDays::from_indices(&[1, 5, 6]).unwrap();
        assert_eq!(days.to_db(), "1,5,6");
        assert_eq!(ActiveDays::from_db("1,5,6"), Some(days));
    }

    #[test]
    fn from_db_accepts_spaced_lists_and_duplicates() {
        let days = ActiveDays::from_db("0, 0 ,3").expect("spaced list should parse");
        assert_eq!(days.indices(), vec![0, 3]);
    }

    #[test]
    fn malformed_day_set_fails_open_to_every_day() {
        for malformed in ["", "  ", "monday", "0,7", "1;2", "0,,2", "-1", "1,2,"] {
            let days = ActiveDays::from_db_lossy(malformed);
            for weekday in ALL_WEEKDAYS {
                assert!(
                    days.contains(weekday),
                    "input `{malformed}` must fail open for {weekday}"
                );
            }
        }
    }

    #[test]
    fn from_db_rejects_what_lossy_recovers() {
        assert_eq!(ActiveDays::from_db("0,7"), None);
        assert_eq!(ActiveDays::from_db(""), None);
        assert!(ActiveDays::from_db("0,6").is_some());
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        assert!(ActiveDays::from_indices(&[7]).is_err());
    }

    #[test]
    fn validate_rejects_empty_day_selection() {
        let mut reminder = ReminderDefinition::new("evening pages", eight_am(), ActiveDays::empty());
        assert_eq!(
            reminder.validate(),
            Err(ReminderValidationError::EmptyActiveDays)
        );

        reminder.active_days = ActiveDays::every_day();
        assert_eq!(reminder.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_oversized_label() {
        let label = "x".repeat(MAX_LABEL_CHARS + 1);
        let reminder = ReminderDefinition::new(label, eight_am(), ActiveDays::every_day());
        assert!(matches!(
            reminder.validate(),
            Err(ReminderValidationError::LabelTooLong { .. })
        ));
    }

    #[test]
    fn serde_round_trip_keeps_day_indices() {
        let reminder = ReminderDefinition::new(
            "morning pages",
            eight_am(),
            ActiveDays::from_indices(&[0, 1, 2, 3, 4]).unwrap(),
        );
        let json = serde_json::to_string(&reminder).unwrap();
        let back: ReminderDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reminder);
    }
}
