//! Scheduling engine: install, cancel, snooze and reconcile wakeups.
//!
//! # Responsibility
//! - Translate persisted definitions into installed one-shot wakeups.
//! - Re-derive every live wakeup from storage at boot and on demand,
//!   making the schedule self-healing after reboots and missed updates.
//!
//! # Invariants
//! - An inactive definition has no live wakeup after any engine call that
//!   sees it.
//! - Cancelling a reminder clears main, then fallback, then snooze slots,
//!   in that order. A crash in between leaves at worst a stale wakeup
//!   that fires as a no-op.
//! - `reschedule_all` is idempotent: deterministic request codes make a
//!   reinstall overwrite, never duplicate.

use crate::clock::Clock;
use crate::model::goal::{GoalDefinition, GoalId};
use crate::model::reminder::{ReminderDefinition, ReminderId};
use crate::repo::goal_repo::GoalStore;
use crate::repo::reminder_repo::ReminderStore;
use crate::repo::RepoError;
use crate::schedule::alarm::{AlarmError, AlarmScheduler, ScheduledDeadline};
use crate::schedule::deadline::{next_fallback_occurrence, next_occurrence};
use crate::schedule::request_code::{request_code, AlarmKind};
use chrono::Duration;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Scheduling-surface errors.
#[derive(Debug)]
pub enum ScheduleError {
    Alarm(AlarmError),
    Repo(RepoError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alarm(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alarm(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AlarmError> for ScheduleError {
    fn from(value: AlarmError) -> Self {
        Self::Alarm(value)
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome summary of one reconciliation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Definitions whose wakeups were (re)installed.
    pub installed: usize,
    /// Inactive definitions whose slots were defensively cleared.
    pub cancelled: usize,
    /// Definitions skipped because their install failed.
    pub failed: usize,
}

/// Public scheduling surface over stores and the alarm boundary.
pub struct ReminderEngine {
    reminders: Arc<dyn ReminderStore>,
    goals: Arc<dyn GoalStore>,
    alarms: Arc<AlarmScheduler>,
    clock: Arc<dyn Clock>,
}

impl ReminderEngine {
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        goals: Arc<dyn GoalStore>,
        alarms: Arc<AlarmScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reminders,
            goals,
            alarms,
            clock,
        }
    }

    /// Installs the main wakeup for one reminder, plus its fallback when
    /// enabled. An inactive definition clears its slots instead.
    pub fn schedule_writing_reminder(&self, def: &ReminderDefinition) -> Result<(), ScheduleError> {
        if !def.is_active {
            self.cancel_reminder(def.id);
            return Ok(());
        }

        let now = self.clock.now();
        let Some(fire_at) = next_occurrence(def.time_of_day, def.active_days, &now) else {
            warn!(
                "event=schedule_install module=schedule status=skipped reason=no_occurrence owner={}",
                def.id
            );
            self.cancel_reminder(def.id);
            return Ok(());
        };
        self.alarms
            .install(&ScheduledDeadline::derive(AlarmKind::Writing, def.id, fire_at))?;

        if def.fallback_enabled {
            self.schedule_fallback(def)?;
        } else {
            // Clears the slot left behind when fallback was toggled off.
            self.alarms.cancel(request_code(AlarmKind::Fallback, &def.id));
        }

        Ok(())
    }

    /// Installs only the dependent fallback wakeup for one reminder.
    pub fn schedule_fallback(&self, def: &ReminderDefinition) -> Result<(), ScheduleError> {
        let now = self.clock.now();
        let Some(fire_at) = next_fallback_occurrence(def.time_of_day, def.active_days, &now) else {
            return Ok(());
        };
        self.alarms
            .install(&ScheduledDeadline::derive(AlarmKind::Fallback, def.id, fire_at))?;
        Ok(())
    }

    /// Installs the wakeup for one goal check-in. An inactive definition
    /// clears its slot instead.
    pub fn schedule_goal_reminder(&self, def: &GoalDefinition) -> Result<(), ScheduleError> {
        if !def.is_active {
            self.cancel_goal_reminder(def.id);
            return Ok(());
        }

        let now = self.clock.now();
        let Some(fire_at) = next_occurrence(def.time_of_day, def.active_days, &now) else {
            warn!(
                "event=schedule_install module=schedule status=skipped reason=no_occurrence owner={}",
                def.id
            );
            self.cancel_goal_reminder(def.id);
            return Ok(());
        };
        self.alarms
            .install(&ScheduledDeadline::derive(AlarmKind::Goal, def.id, fire_at))?;
        Ok(())
    }

    /// Installs a one-shot snooze wakeup for a writing reminder.
    pub fn snooze_writing_reminder(
        &self,
        id: ReminderId,
        minutes: u32,
    ) -> Result<(), ScheduleError> {
        let fire_at = self.clock.now() + Duration::minutes(i64::from(minutes));
        self.alarms
            .install(&ScheduledDeadline::derive(AlarmKind::Snooze, id, fire_at))?;
        info!(
            "event=snooze module=schedule status=ok owner={id} minutes={minutes}"
        );
        Ok(())
    }

    /// Cancels every wakeup slot owned by one reminder.
    ///
    /// Main first, then fallback, then snooze; callers remove the
    /// persisted record only afterwards.
    pub fn cancel_reminder(&self, id: ReminderId) {
        self.alarms.cancel(request_code(AlarmKind::Writing, &id));
        self.alarms.cancel(request_code(AlarmKind::Fallback, &id));
        self.alarms.cancel(request_code(AlarmKind::Snooze, &id));
    }

    /// Cancels the wakeup slot owned by one goal.
    pub fn cancel_goal_reminder(&self, id: GoalId) {
        self.alarms.cancel(request_code(AlarmKind::Goal, &id));
    }

    /// Re-derives and reinstalls every wakeup from persisted definitions.
    ///
    /// Runs at boot and on demand. One definition's failure never aborts
    /// the rest; running twice in a row yields the same installed set as
    /// running once.
    pub fn reschedule_all(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        match self.reminders.list_all_reminders() {
            Ok(defs) => {
                for def in defs {
                    if def.is_active {
                        match self.schedule_writing_reminder(&def) {
                            Ok(()) => report.installed += 1,
                            Err(err) => {
                                report.failed += 1;
                                error!(
                                    "event=reconcile_item module=schedule status=error kind=writing owner={} error={err}",
                                    def.id
                                );
                            }
                        }
                    } else {
                        self.cancel_reminder(def.id);
                        report.cancelled += 1;
                    }
                }
            }
            Err(err) => {
                report.failed += 1;
                error!("event=reconcile module=schedule status=error source=reminders error={err}");
            }
        }

        match self.goals.list_all_goals() {
            Ok(defs) => {
                for def in defs {
                    if def.is_active {
                        match self.schedule_goal_reminder(&def) {
                            Ok(()) => report.installed += 1,
                            Err(err) => {
                                report.failed += 1;
                                error!(
                                    "event=reconcile_item module=schedule status=error kind=goal owner={} error={err}",
                                    def.id
                                );
                            }
                        }
                    } else {
                        self.cancel_goal_reminder(def.id);
                        report.cancelled += 1;
                    }
                }
            }
            Err(err) => {
                report.failed += 1;
                error!("event=reconcile module=schedule status=error source=goals error={err}");
            }
        }

        info!(
            "event=reconcile module=schedule status=ok installed={} cancelled={} failed={}",
            report.installed, report.cancelled, report.failed
        );
        report
    }
}
