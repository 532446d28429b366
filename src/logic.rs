/*
Calendar-day and list helpers used by the stores.
Kept free of storage and HTTP so they can be tested on their own.
*/

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::DailyStat;

// Number of days kept in the daily history
pub const MAX_DAILY_STATS: usize = 365;

pub const CSV_HEADER: &str = "Date,Pomodoros,Focus Time (min),Tasks Completed";

// Calendar-day key: "YYYY-MM-DD"
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn yesterday_key(today: NaiveDate) -> String {
    // pred_opt only fails at NaiveDate::MIN
    today.pred_opt().map(day_key).unwrap_or_default()
}

// Streak after an active event on `today`.
//
// Rules:
// - already active today     -> None (nothing changes)
// - last active yesterday    -> current + 1
// - gap, or never active     -> 1
// Longest is never lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

pub fn next_streak(last_active_date: &str, today: NaiveDate, streak: Streak) -> Option<Streak> {
    if last_active_date == day_key(today) {
        return None;
    }

    let current = if last_active_date == yesterday_key(today) {
        streak.current + 1
    } else {
        1
    };

    Some(Streak {
        current,
        longest: streak.longest.max(current),
    })
}

// Find the entry for `date` or append an empty one at the end.
pub fn day_entry<'a>(days: &'a mut Vec<DailyStat>, date: &str) -> &'a mut DailyStat {
    let idx = match days.iter().position(|d| d.date == date) {
        Some(idx) => idx,
        None => {
            days.push(DailyStat::empty(date));
            days.len() - 1
        }
    };
    &mut days[idx]
}

// Drop the oldest entries so at most `max` remain.
pub fn trim_oldest<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}

// Move the item at `from` to `to`, shifting the ones in between.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(AppError::InvalidArgument(format!(
            "cannot move item {from} to {to} in a list of {len}"
        )));
    }

    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

// Header line, then one line per day in list order. Fields are not quoted;
// date keys never contain commas.
pub fn stats_csv(days: &[DailyStat]) -> String {
    let mut lines = Vec::with_capacity(days.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for d in days {
        lines.push(format!(
            "{},{},{},{}",
            d.date, d.total_pomodoros, d.total_focus_time, d.tasks_completed
        ));
    }

    lines.join("\n")
}
