//! Trusted boundary to the OS one-shot wakeup facility.
//!
//! # Responsibility
//! - Install and cancel absolute-time wakeups by request code.
//! - Choose between exact (wake-from-idle) and best-effort installation
//!   based on the runtime-granted capability.
//!
//! # Invariants
//! - Wakeups are one-shot: a fired deadline is gone until something
//!   reinstalls its next occurrence.
//! - Installing an already-used code replaces the previous wakeup.
//! - Cancelling an unknown code is a no-op, never an error.
//! - A missing exact-wakeup grant degrades the install mode with a logged
//!   warning; it never fails the install. A late notification beats a
//!   silently dropped one.

use crate::notify::PermissionProbe;
use crate::schedule::request_code::{request_code, AlarmKind, RequestCode};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// How a wakeup was handed to the timer facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Guaranteed delivery, including during deep power-saving states.
    Exact,
    /// Delivery may be deferred by the platform.
    BestEffort,
}

impl InstallMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::BestEffort => "best_effort",
        }
    }
}

/// One derived wakeup, recomputed on every (re)install and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDeadline {
    pub kind: AlarmKind,
    pub owner: Uuid,
    pub fire_at: DateTime<Utc>,
    pub code: RequestCode,
}

impl ScheduledDeadline {
    /// Derives the deadline for `(kind, owner)` firing at the given local
    /// instant.
    pub fn derive(kind: AlarmKind, owner: Uuid, fire_at: DateTime<FixedOffset>) -> Self {
        Self {
            kind,
            owner,
            fire_at: fire_at.with_timezone(&Utc),
            code: request_code(kind, &owner),
        }
    }
}

/// Alarm boundary errors.
#[derive(Debug)]
pub enum AlarmError {
    /// The underlying timer facility rejected the request.
    Driver(String),
}

impl Display for AlarmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Driver(message) => write!(f, "wakeup driver failure: {message}"),
        }
    }
}

impl Error for AlarmError {}

/// The OS timer facility seam.
///
/// Implementations must treat `cancel` of an uninstalled code as a no-op.
pub trait WakeupDriver: Send + Sync {
    fn install(
        &self,
        code: RequestCode,
        fire_at: DateTime<Utc>,
        mode: InstallMode,
    ) -> Result<(), AlarmError>;
    fn cancel(&self, code: RequestCode);
}

/// Capability-gated scheduler over a wakeup driver.
///
/// Constructor-injected wherever scheduling happens; there is no ambient
/// global handle to the timer facility.
pub struct AlarmScheduler {
    driver: Arc<dyn WakeupDriver>,
    permissions: Arc<dyn PermissionProbe>,
}

impl AlarmScheduler {
    pub fn new(driver: Arc<dyn WakeupDriver>, permissions: Arc<dyn PermissionProbe>) -> Self {
        Self {
            driver,
            permissions,
        }
    }

    /// Installs one wakeup, choosing the mode from the current grant.
    ///
    /// Returns the mode actually used so callers can surface degradation.
    pub fn install(&self, deadline: &ScheduledDeadline) -> Result<InstallMode, AlarmError> {
        let mode = if self.permissions.can_schedule_exact_wakeups() {
            InstallMode::Exact
        } else {
            warn!(
                "event=alarm_install module=schedule status=degraded kind={} code={} reason=exact_wakeup_denied",
                deadline.kind.as_str(),
                deadline.code
            );
            InstallMode::BestEffort
        };

        self.driver.install(deadline.code, deadline.fire_at, mode)?;
        info!(
            "event=alarm_install module=schedule status=ok kind={} code={} fire_at={} mode={}",
            deadline.kind.as_str(),
            deadline.code,
            deadline.fire_at.to_rfc3339(),
            mode.as_str()
        );
        Ok(mode)
    }

    /// Cancels one wakeup slot. No-op when nothing is installed.
    pub fn cancel(&self, code: RequestCode) {
        self.driver.cancel(code);
        debug!("event=alarm_cancel module=schedule status=ok code={code}");
    }
}

/// Snapshot of one installed wakeup in the in-memory driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstalledWakeup {
    pub fire_at: DateTime<Utc>,
    pub mode: InstallMode,
}

/// In-memory wakeup driver.
///
/// Stands in for the platform timer facility in tests, the CLI probe and
/// any embedder that has not wired a real backend yet. Does not fire by
/// itself; firings are delivered by calling the dispatcher directly.
#[derive(Debug, Default)]
pub struct MemoryWakeupDriver {
    slots: Mutex<BTreeMap<RequestCode, InstalledWakeup>>,
}

impl MemoryWakeupDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all installed wakeups, ordered by code.
    pub fn installed(&self) -> BTreeMap<RequestCode, InstalledWakeup> {
        self.slots
            .lock()
            .map(|slots| slots.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, code: RequestCode) -> Option<InstalledWakeup> {
        self.slots
            .lock()
            .ok()
            .and_then(|slots| slots.get(&code).copied())
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WakeupDriver for MemoryWakeupDriver {
    fn install(
        &self,
        code: RequestCode,
        fire_at: DateTime<Utc>,
        mode: InstallMode,
    ) -> Result<(), AlarmError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AlarmError::Driver("wakeup slot table poisoned".to_string()))?;
        slots.insert(code, InstalledWakeup { fire_at, mode });
        Ok(())
    }

    fn cancel(&self, code: RequestCode) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.remove(&code);
        }
    }
}
