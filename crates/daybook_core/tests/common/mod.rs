#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone};
use daybook_core::db::open_db_in_memory;
use daybook_core::schedule::CountingLifecycle;
use daybook_core::{
    AlarmScheduler, DeliveryDispatcher, EntryStore, FixedClock, GoalService, MemoryWakeupDriver,
    Notification, NotificationPresenter, NotifyError, PermissionProbe, ReminderEngine,
    ReminderService, RepoError, RepoResult, SqliteGoalStore, SqliteJournalStore,
    SqliteReminderStore, StreakSource,
};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub fn tz() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Presenter stub recording everything it is asked to show.
#[derive(Default)]
pub struct RecordingPresenter {
    shown: Mutex<Vec<Notification>>,
    transient: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn transient(&self) -> Vec<String> {
        self.transient.lock().unwrap().clone()
    }
}

impl NotificationPresenter for RecordingPresenter {
    fn show(&self, notification: Notification) -> Result<(), NotifyError> {
        self.shown.lock().unwrap().push(notification);
        Ok(())
    }

    fn show_transient(&self, body: &str) -> Result<(), NotifyError> {
        self.transient.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

/// Permission probe whose grants can be flipped mid-test.
pub struct TogglePermissions {
    exact: AtomicBool,
    notifications: AtomicBool,
}

impl TogglePermissions {
    pub fn granted() -> Self {
        Self {
            exact: AtomicBool::new(true),
            notifications: AtomicBool::new(true),
        }
    }

    pub fn set_exact(&self, granted: bool) {
        self.exact.store(granted, Ordering::SeqCst);
    }

    pub fn set_notifications(&self, granted: bool) {
        self.notifications.store(granted, Ordering::SeqCst);
    }
}

impl PermissionProbe for TogglePermissions {
    fn can_schedule_exact_wakeups(&self) -> bool {
        self.exact.load(Ordering::SeqCst)
    }

    fn can_show_notifications(&self) -> bool {
        self.notifications.load(Ordering::SeqCst)
    }
}

/// Entry store that always fails, simulating a storage outage.
pub struct FailingEntryStore;

impl EntryStore for FailingEntryStore {
    fn count_entries_in_range(&self, _start_ms: i64, _end_ms: i64) -> RepoResult<u32> {
        Err(RepoError::InvalidData(
            "simulated entry store outage".to_string(),
        ))
    }
}

/// Streak source that always fails.
pub struct FailingStreakSource;

impl StreakSource for FailingStreakSource {
    fn current_streak(&self) -> RepoResult<u32> {
        Err(RepoError::InvalidData(
            "simulated streak outage".to_string(),
        ))
    }
}

/// Streak source answering a fixed value.
pub struct StaticStreak(pub u32);

impl StreakSource for StaticStreak {
    fn current_streak(&self) -> RepoResult<u32> {
        Ok(self.0)
    }
}

/// Fully wired core over in-memory SQLite and the in-memory driver.
pub struct Harness {
    pub conn: Arc<Mutex<Connection>>,
    pub clock: Arc<FixedClock>,
    pub driver: Arc<MemoryWakeupDriver>,
    pub presenter: Arc<RecordingPresenter>,
    pub permissions: Arc<TogglePermissions>,
    pub lifecycle: Arc<CountingLifecycle>,
    pub alarms: Arc<AlarmScheduler>,
    pub reminders: Arc<SqliteReminderStore>,
    pub goals: Arc<SqliteGoalStore>,
    pub journal: Arc<SqliteJournalStore>,
    pub engine: Arc<ReminderEngine>,
}

impl Harness {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        let conn = Arc::new(Mutex::new(open_db_in_memory().unwrap()));
        let clock = Arc::new(FixedClock::new(now));
        let driver = Arc::new(MemoryWakeupDriver::new());
        let presenter = Arc::new(RecordingPresenter::new());
        let permissions = Arc::new(TogglePermissions::granted());
        let lifecycle = Arc::new(CountingLifecycle::new());
        let alarms = Arc::new(AlarmScheduler::new(driver.clone(), permissions.clone()));
        let reminders = Arc::new(SqliteReminderStore::new(Arc::clone(&conn)));
        let goals = Arc::new(SqliteGoalStore::new(Arc::clone(&conn)));
        let journal = Arc::new(SqliteJournalStore::new(Arc::clone(&conn), clock.clone()));
        let engine = Arc::new(ReminderEngine::new(
            reminders.clone(),
            goals.clone(),
            alarms.clone(),
            clock.clone(),
        ));

        Self {
            conn,
            clock,
            driver,
            presenter,
            permissions,
            lifecycle,
            alarms,
            reminders,
            goals,
            journal,
            engine,
        }
    }

    pub fn dispatcher(&self) -> DeliveryDispatcher {
        self.dispatcher_with(self.journal.clone(), self.journal.clone())
    }

    pub fn dispatcher_with(
        &self,
        entries: Arc<dyn EntryStore>,
        streaks: Arc<dyn StreakSource>,
    ) -> DeliveryDispatcher {
        DeliveryDispatcher::new(
            self.reminders.clone(),
            self.goals.clone(),
            entries,
            streaks,
            self.presenter.clone(),
            self.permissions.clone(),
            self.alarms.clone(),
            self.lifecycle.clone(),
            self.clock.clone(),
        )
    }

    pub fn reminder_service(&self) -> ReminderService {
        ReminderService::new(self.reminders.clone(), self.engine.clone())
    }

    pub fn goal_service(&self) -> GoalService {
        GoalService::new(
            self.goals.clone(),
            self.engine.clone(),
            self.presenter.clone(),
            self.clock.clone(),
        )
    }
}
