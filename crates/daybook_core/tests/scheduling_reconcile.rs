mod common;

use chrono::Utc;
use common::{at, hm, Harness};
use daybook_core::schedule::request_code;
use daybook_core::{
    ActiveDays, AlarmKind, CreateGoalRequest, CreateReminderRequest, ReminderStore,
};

#[test]
fn weekday_reminder_scheduled_on_saturday_lands_on_monday() {
    // Saturday 2024-06-01 09:00 local; reminder 08:00 Mon-Fri.
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let service = harness.reminder_service();

    let created = service
        .create_reminder(CreateReminderRequest {
            label: "morning pages".to_string(),
            time_of_day: hm(8, 0),
            active_days: ActiveDays::from_indices(&[0, 1, 2, 3, 4]).unwrap(),
            fallback_enabled: false,
        })
        .unwrap();

    let code = request_code(AlarmKind::Writing, &created.id);
    let wakeup = harness.driver.get(code).unwrap();
    assert_eq!(wakeup.fire_at, at(2024, 6, 3, 8, 0).with_timezone(&Utc));
}

#[test]
fn fallback_enabled_reminder_installs_both_slots_thirty_minutes_apart() {
    let harness = Harness::at(at(2024, 6, 1, 7, 0));
    let service = harness.reminder_service();

    let created = service
        .create_reminder(CreateReminderRequest {
            label: "evening pages".to_string(),
            time_of_day: hm(20, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: true,
        })
        .unwrap();

    let main = harness
        .driver
        .get(request_code(AlarmKind::Writing, &created.id))
        .unwrap();
    let fallback = harness
        .driver
        .get(request_code(AlarmKind::Fallback, &created.id))
        .unwrap();

    assert_eq!(main.fire_at, at(2024, 6, 1, 20, 0).with_timezone(&Utc));
    assert_eq!(fallback.fire_at, at(2024, 6, 1, 20, 30).with_timezone(&Utc));
    assert!(fallback.fire_at > main.fire_at);
}

#[test]
fn disabling_fallback_clears_its_slot_on_reinstall() {
    let harness = Harness::at(at(2024, 6, 1, 7, 0));
    let service = harness.reminder_service();

    let mut created = service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(20, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: true,
        })
        .unwrap();
    assert_eq!(harness.driver.len(), 2);

    created.fallback_enabled = false;
    service.update_reminder(&created).unwrap();

    assert_eq!(harness.driver.len(), 1);
    assert!(harness
        .driver
        .get(request_code(AlarmKind::Fallback, &created.id))
        .is_none());
}

#[test]
fn reschedule_all_is_idempotent() {
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let reminder_service = harness.reminder_service();
    let goal_service = harness.goal_service();

    reminder_service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(8, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: true,
        })
        .unwrap();
    goal_service
        .create_goal(CreateGoalRequest {
            title: "read".to_string(),
            time_of_day: hm(21, 0),
            active_days: ActiveDays::every_day(),
        })
        .unwrap();

    let first = harness.engine.reschedule_all();
    let after_first = harness.driver.installed();
    let second = harness.engine.reschedule_all();
    let after_second = harness.driver.installed();

    assert_eq!(first.installed, 2);
    assert_eq!(first.failed, 0);
    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
    assert_eq!(after_first.len(), 3);
}

#[test]
fn reconcile_clears_slots_of_records_toggled_off_behind_the_engine() {
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let service = harness.reminder_service();

    let mut created = service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(8, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: true,
        })
        .unwrap();
    assert_eq!(harness.driver.len(), 2);

    // Simulate drift: the record is toggled off without a scheduler call.
    created.is_active = false;
    harness.reminders.update_reminder(&created).unwrap();

    let report = harness.engine.reschedule_all();
    assert_eq!(report.cancelled, 1);
    assert!(harness.driver.is_empty());
}

#[test]
fn cancel_reminder_clears_main_fallback_and_snooze_slots() {
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let service = harness.reminder_service();

    let created = service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(20, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: true,
        })
        .unwrap();
    service.snooze(created.id, 15).unwrap();
    assert_eq!(harness.driver.len(), 3);

    harness.engine.cancel_reminder(created.id);
    assert!(harness.driver.is_empty());
}

#[test]
fn delete_via_service_cancels_wakeups_and_removes_the_record() {
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let service = harness.reminder_service();

    let created = service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(20, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: true,
        })
        .unwrap();

    service.delete_reminder(created.id).unwrap();

    assert!(harness.driver.is_empty());
    assert!(harness.reminders.get_reminder(created.id).unwrap().is_none());
}

#[test]
fn exact_permission_revocation_degrades_the_next_reinstall() {
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let service = harness.reminder_service();

    let created = service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(20, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: false,
        })
        .unwrap();

    let code = request_code(AlarmKind::Writing, &created.id);
    assert_eq!(
        harness.driver.get(code).unwrap().mode,
        daybook_core::schedule::InstallMode::Exact
    );

    harness.permissions.set_exact(false);
    let report = harness.engine.reschedule_all();

    assert_eq!(report.failed, 0);
    assert_eq!(
        harness.driver.get(code).unwrap().mode,
        daybook_core::schedule::InstallMode::BestEffort
    );
}

#[test]
fn snooze_installs_a_one_shot_slot_at_the_requested_offset() {
    let harness = Harness::at(at(2024, 6, 1, 9, 0));
    let service = harness.reminder_service();

    let created = service
        .create_reminder(CreateReminderRequest {
            label: "pages".to_string(),
            time_of_day: hm(20, 0),
            active_days: ActiveDays::every_day(),
            fallback_enabled: false,
        })
        .unwrap();

    service.snooze(created.id, 10).unwrap();
    let snooze = harness
        .driver
        .get(request_code(AlarmKind::Snooze, &created.id))
        .unwrap();
    assert_eq!(snooze.fire_at, at(2024, 6, 1, 9, 10).with_timezone(&Utc));
}
