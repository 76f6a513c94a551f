//! Deterministic writing prompt selection.
//!
//! # Responsibility
//! - Pick a prompt that is stable within a calendar day and varies across
//!   days. No real randomness: the day is the seed.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MORNING_PROMPTS: &[&str] = &[
    "What would make today feel well spent?",
    "Name one thing you are looking forward to today.",
    "What is still on your mind from yesterday?",
    "What would you like to say no to today?",
    "Describe this morning in three honest sentences.",
    "What small thing deserves more attention today?",
];

pub const EVENING_PROMPTS: &[&str] = &[
    "What surprised you today?",
    "What drained you today, and what gave something back?",
    "Write down one moment you want to remember from today.",
    "What did you avoid today?",
    "What would you tell this morning's self?",
    "Which conversation stuck with you today?",
];

/// Deterministic index into a pool of `pool_len` items for one day seed.
///
/// Callers must pass a non-empty pool; an empty one pins the index to 0.
pub fn prompt_index(day_seed: u32, pool_len: usize) -> usize {
    if pool_len == 0 {
        return 0;
    }
    let mut rng = StdRng::seed_from_u64(u64::from(day_seed));
    rng.gen_range(0..pool_len)
}

/// The writing prompt for a given local date and reminder time.
///
/// Morning reminders (before noon) draw from the morning pool, later ones
/// from the evening pool.
pub fn writing_prompt_for(date: NaiveDate, time_of_day: NaiveTime) -> &'static str {
    let pool = if time_of_day.hour() < 12 {
        MORNING_PROMPTS
    } else {
        EVENING_PROMPTS
    };
    pool[prompt_index(date.ordinal(), pool.len())]
}

#[cfg(test)]
mod tests {
    use super::{prompt_index, writing_prompt_for, EVENING_PROMPTS, MORNING_PROMPTS};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn same_day_always_picks_the_same_prompt() {
        for seed in [1, 42, 180, 366] {
            assert_eq!(prompt_index(seed, 6), prompt_index(seed, 6));
        }
    }

    #[test]
    fn prompts_vary_across_the_year() {
        let indices: std::collections::BTreeSet<usize> =
            (1..=60).map(|seed| prompt_index(seed, MORNING_PROMPTS.len())).collect();
        assert!(indices.len() > 1, "sixty days should not share one prompt");
    }

    #[test]
    fn reminder_hour_selects_the_pool() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let morning = writing_prompt_for(date, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let evening = writing_prompt_for(date, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert!(MORNING_PROMPTS.contains(&morning));
        assert!(EVENING_PROMPTS.contains(&evening));
    }

    #[test]
    fn empty_pool_pins_index_to_zero() {
        assert_eq!(prompt_index(123, 0), 0);
    }
}
