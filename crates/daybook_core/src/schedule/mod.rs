//! Reminder scheduling and delivery engine.
//!
//! # Responsibility
//! - Derive absolute wakeup deadlines from persisted definitions.
//! - Install/cancel one-shot OS wakeups through the alarm boundary.
//! - Dispatch firings into notifications or the fallback verification.
//! - Reconcile every live wakeup from storage at boot and on demand.
//!
//! # Invariants
//! - Wakeups are single-shot: every firing reinstalls its own next
//!   occurrence; nothing at this layer is a recurring timer.
//! - Request codes are a pure function of `(kind, owner)`, so a later
//!   cancel or reinstall always addresses the slot used at install time.
//!
//! # See also
//! - docs/architecture/reminder-engine.md

pub mod alarm;
pub mod deadline;
pub mod dispatch;
pub mod engine;
pub mod fallback;
pub mod lifecycle;
pub mod request_code;

pub use alarm::{
    AlarmError, AlarmScheduler, InstallMode, InstalledWakeup, MemoryWakeupDriver,
    ScheduledDeadline, WakeupDriver,
};
pub use deadline::{
    next_fallback_occurrence, next_fire_time, next_occurrence, FALLBACK_OFFSET_MINUTES,
};
pub use dispatch::DeliveryDispatcher;
pub use engine::{ReconcileReport, ReminderEngine, ScheduleError};
pub use fallback::{FallbackVerifier, FALLBACK_CHECK_TIMEOUT};
pub use lifecycle::{CompletionToken, CountingLifecycle, DispatchLifecycle, UnmanagedLifecycle};
pub use request_code::{request_code, AlarmKind, RequestCode};
