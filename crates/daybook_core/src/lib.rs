//! Core domain logic for Daybook.
//! This crate is the single source of truth for reminder scheduling
//! invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod schedule;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::goal::{GoalDefinition, GoalId};
pub use model::reminder::{
    ActiveDays, ReminderDefinition, ReminderId, ReminderValidationError,
};
pub use notify::{
    InlineAction, Notification, NotificationChannel, NotificationPresenter, NotifyError,
    PermissionProbe, StaticPermissions, TapAction,
};
pub use repo::goal_repo::{CheckInOutcome, GoalStore, SqliteGoalStore};
pub use repo::journal_repo::{EntryStore, SqliteJournalStore, StreakSource};
pub use repo::reminder_repo::{ReminderStore, SqliteReminderStore};
pub use repo::{RepoError, RepoResult};
pub use schedule::{
    request_code, AlarmKind, AlarmScheduler, DeliveryDispatcher, FallbackVerifier,
    MemoryWakeupDriver, ReconcileReport, ReminderEngine, RequestCode, ScheduleError,
    ScheduledDeadline, WakeupDriver,
};
pub use service::goal_service::{CreateGoalRequest, GoalService};
pub use service::reminder_service::{CreateReminderRequest, ReminderService};
pub use service::ServiceError;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
