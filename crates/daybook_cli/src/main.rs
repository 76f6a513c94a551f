//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daybook_core` linkage.
//! - Exercise the scheduling path end to end against the in-memory
//!   wakeup driver for quick local sanity checks.

use chrono::NaiveTime;
use daybook_core::db::open_db_in_memory;
use daybook_core::{
    ActiveDays, AlarmScheduler, CreateReminderRequest, MemoryWakeupDriver, ReminderEngine,
    ReminderService, SqliteGoalStore, SqliteReminderStore, StaticPermissions, SystemClock,
};
use std::sync::{Arc, Mutex};

fn main() {
    println!("daybook_core ping={}", daybook_core::ping());
    println!("daybook_core version={}", daybook_core::core_version());

    if let Err(err) = demo_schedule() {
        eprintln!("schedule probe failed: {err}");
        std::process::exit(1);
    }
}

fn demo_schedule() -> Result<(), Box<dyn std::error::Error>> {
    let conn = Arc::new(Mutex::new(open_db_in_memory()?));
    let clock = Arc::new(SystemClock);
    let reminders = Arc::new(SqliteReminderStore::new(Arc::clone(&conn)));
    let goals = Arc::new(SqliteGoalStore::new(Arc::clone(&conn)));
    let driver = Arc::new(MemoryWakeupDriver::new());
    let alarms = Arc::new(AlarmScheduler::new(
        driver.clone(),
        Arc::new(StaticPermissions::granted()),
    ));
    let engine = Arc::new(ReminderEngine::new(reminders.clone(), goals, alarms, clock));
    let service = ReminderService::new(reminders, engine);

    let time_of_day = NaiveTime::from_hms_opt(20, 0, 0).ok_or("invalid probe time")?;
    let created = service.create_reminder(CreateReminderRequest {
        label: "Evening pages".to_string(),
        time_of_day,
        active_days: ActiveDays::every_day(),
        fallback_enabled: true,
    })?;
    println!("created reminder id={}", created.id);

    for (code, wakeup) in driver.installed() {
        println!(
            "wakeup code={code} fire_at={} mode={}",
            wakeup.fire_at.to_rfc3339(),
            wakeup.mode.as_str()
        );
    }

    Ok(())
}
