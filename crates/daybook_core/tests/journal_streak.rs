mod common;

use common::{at, Harness};
use daybook_core::clock::day_bounds_on;
use daybook_core::{EntryStore, StreakSource};

#[test]
fn count_is_half_open_over_the_local_day() {
    let harness = Harness::at(at(2024, 6, 2, 0, 0));
    harness.journal.append_entry("midnight words").unwrap();

    let offset = common::tz();
    let june_1 = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let june_2 = chrono::NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

    let (start_1, end_1) = day_bounds_on(june_1, offset);
    let (start_2, end_2) = day_bounds_on(june_2, offset);

    assert_eq!(
        harness.journal.count_entries_in_range(start_1, end_1).unwrap(),
        0
    );
    assert_eq!(
        harness.journal.count_entries_in_range(start_2, end_2).unwrap(),
        1
    );
}

#[test]
fn streak_counts_consecutive_days_ending_today() {
    let harness = Harness::at(at(2024, 6, 1, 10, 0));
    harness.journal.append_entry("day one").unwrap();
    harness.clock.set(at(2024, 6, 2, 9, 0));
    harness.journal.append_entry("day two").unwrap();
    harness.clock.set(at(2024, 6, 3, 8, 0));
    harness.journal.append_entry("day three").unwrap();

    harness.clock.set(at(2024, 6, 3, 12, 0));
    assert_eq!(harness.journal.current_streak().unwrap(), 3);
}

#[test]
fn streak_survives_a_not_yet_written_today() {
    let harness = Harness::at(at(2024, 6, 1, 10, 0));
    harness.journal.append_entry("day one").unwrap();
    harness.clock.set(at(2024, 6, 2, 9, 0));
    harness.journal.append_entry("day two").unwrap();

    // June 3rd morning, nothing written yet today.
    harness.clock.set(at(2024, 6, 3, 7, 30));
    assert_eq!(harness.journal.current_streak().unwrap(), 2);
}

#[test]
fn a_missed_day_resets_the_streak() {
    let harness = Harness::at(at(2024, 6, 1, 10, 0));
    harness.journal.append_entry("day one").unwrap();

    harness.clock.set(at(2024, 6, 3, 12, 0));
    assert_eq!(harness.journal.current_streak().unwrap(), 0);
}

#[test]
fn empty_journal_has_zero_streak() {
    let harness = Harness::at(at(2024, 6, 1, 10, 0));
    assert_eq!(harness.journal.current_streak().unwrap(), 0);
}
