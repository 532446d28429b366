//! Focus statistics: totals, per-day history and the activity streak.

use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;
use crate::logic::{self, Streak};
use crate::models::{DailyStat, UserStats};
use crate::store::{self, KeyValueStore, Persisted};
use crate::tasks::CompletionTracker;

pub const STATS_KEY: &str = "pomodoro-stats";

pub struct StatsStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    stats: Arc<UserStats>,
}

impl StatsStore {
    /// Load the stored record, or start from zeroed stats when it is
    /// missing or unreadable.
    pub fn load(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let stats: UserStats = store::load_or_default(kv.as_ref(), STATS_KEY);
        tracing::debug!(
            days = stats.daily_stats.len(),
            total_pomodoros = stats.total_pomodoros,
            "stats loaded"
        );
        Self {
            kv,
            clock,
            stats: Arc::new(stats),
        }
    }

    /// Current snapshot. Mutations replace it; a returned snapshot never
    /// changes afterwards.
    pub fn snapshot(&self) -> Arc<UserStats> {
        Arc::clone(&self.stats)
    }

    /// Today's entry, or a zeroed one if nothing happened yet today.
    pub fn today_stats(&self) -> DailyStat {
        let today = logic::day_key(self.clock.today());
        self.stats
            .daily_stats
            .iter()
            .find(|d| d.date == today)
            .cloned()
            .unwrap_or_else(|| DailyStat::empty(today))
    }

    /// Record one finished focus session of `duration` minutes.
    pub fn add_session(&mut self, duration: u32) -> Persisted {
        let today = logic::day_key(self.clock.today());
        let mut next = (*self.stats).clone();

        let day = logic::day_entry(&mut next.daily_stats, &today);
        day.total_pomodoros = day.total_pomodoros.saturating_add(1);
        day.total_focus_time = day.total_focus_time.saturating_add(duration);

        next.total_pomodoros = next.total_pomodoros.saturating_add(1);
        next.total_focus_time = next.total_focus_time.saturating_add(duration);

        logic::trim_oldest(&mut next.daily_stats, logic::MAX_DAILY_STATS);

        self.commit(next)
    }

    // Does not trim the daily history; only add_session does.
    pub fn increment_tasks_completed(&mut self) -> Persisted {
        let today = logic::day_key(self.clock.today());
        let mut next = (*self.stats).clone();

        let day = logic::day_entry(&mut next.daily_stats, &today);
        day.tasks_completed = day.tasks_completed.saturating_add(1);
        next.total_tasks_completed = next.total_tasks_completed.saturating_add(1);

        self.commit(next)
    }

    /// Count today as an active day. Calling it again on the same day
    /// changes nothing.
    pub fn update_streak(&mut self) -> Persisted {
        let today = self.clock.today();
        let current = Streak {
            current: self.stats.current_streak,
            longest: self.stats.longest_streak,
        };

        let Some(streak) = logic::next_streak(&self.stats.last_active_date, today, current) else {
            return Persisted::Unchanged;
        };

        let mut next = (*self.stats).clone();
        next.current_streak = streak.current;
        next.longest_streak = streak.longest;
        next.last_active_date = logic::day_key(today);

        self.commit(next)
    }

    pub fn reset_stats(&mut self) -> Persisted {
        tracing::info!("resetting stats");
        self.commit(UserStats::default())
    }

    /// Daily history as CSV, oldest day first.
    pub fn export_stats(&self) -> String {
        logic::stats_csv(&self.stats.daily_stats)
    }

    fn commit(&mut self, next: UserStats) -> Persisted {
        self.stats = Arc::new(next);
        store::save(self.kv.as_ref(), STATS_KEY, self.stats.as_ref())
    }
}

impl CompletionTracker for Mutex<StatsStore> {
    fn task_completed(&self) {
        let mut stats = self.lock().unwrap_or_else(PoisonError::into_inner);
        if let Persisted::Failed(e) = stats.increment_tasks_completed() {
            tracing::warn!(error = %e, "task completion counted but not saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::logic::CSV_HEADER;
    use crate::store::{KeyValueStore, MemoryStore, tests::ReadOnlyStore};

    fn setup() -> (Arc<MemoryStore>, Arc<FixedClock>, StatsStore) {
        let kv = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::at("2024-05-10T09:00:00+02:00"));
        let store = StatsStore::load(kv.clone(), clock.clone());
        (kv, clock, store)
    }

    #[test]
    fn sessions_on_one_day_accumulate() {
        let (_, _, mut store) = setup();
        for d in [25, 25, 50] {
            assert!(store.add_session(d).is_saved());
        }

        let stats = store.snapshot();
        assert_eq!(stats.total_pomodoros, 3);
        assert_eq!(stats.total_focus_time, 100);
        assert_eq!(stats.daily_stats.len(), 1);

        let today = store.today_stats();
        assert_eq!(today.date, "2024-05-10");
        assert_eq!(today.total_pomodoros, 3);
        assert_eq!(today.total_focus_time, 100);
    }

    #[test]
    fn today_stats_is_zeroed_when_idle() {
        let (_, clock, mut store) = setup();
        store.add_session(25);
        clock.advance_days(1);
        assert_eq!(store.today_stats(), DailyStat::empty("2024-05-11"));
        // reading does not create an entry
        assert_eq!(store.snapshot().daily_stats.len(), 1);
    }

    #[test]
    fn history_is_capped_at_365_days() {
        let (_, clock, mut store) = setup();
        for _ in 0..370 {
            store.add_session(25);
            clock.advance_days(1);
        }

        let stats = store.snapshot();
        assert_eq!(stats.daily_stats.len(), 365);
        assert_eq!(stats.total_pomodoros, 370);
        // the five oldest days were dropped
        assert_eq!(stats.daily_stats[0].date, "2024-05-15");

        let mut dates: Vec<_> = stats.daily_stats.iter().map(|d| d.date.clone()).collect();
        dates.dedup();
        assert_eq!(dates.len(), 365);
    }

    #[test]
    fn task_completion_on_a_new_day_skips_the_trim() {
        let (_, clock, mut store) = setup();
        for _ in 0..365 {
            store.add_session(25);
            clock.advance_days(1);
        }
        assert_eq!(store.snapshot().daily_stats.len(), 365);

        store.increment_tasks_completed();
        assert_eq!(store.snapshot().daily_stats.len(), 366);

        // the next session trims back down
        store.add_session(25);
        let stats = store.snapshot();
        assert_eq!(stats.daily_stats.len(), 365);
        assert_eq!(stats.daily_stats[0].date, "2024-05-11");
    }

    #[test]
    fn task_completions_count_per_day() {
        let (_, _, mut store) = setup();
        store.add_session(25);
        store.increment_tasks_completed();
        store.increment_tasks_completed();

        let stats = store.snapshot();
        assert_eq!(stats.total_tasks_completed, 2);
        assert_eq!(stats.total_pomodoros, 1);
        assert_eq!(store.today_stats().tasks_completed, 2);
    }

    #[test]
    fn streak_is_idempotent_within_a_day() {
        let (_, _, mut store) = setup();
        assert!(store.update_streak().is_saved());
        let first = store.snapshot();
        assert!(matches!(store.update_streak(), Persisted::Unchanged));
        assert!(Arc::ptr_eq(&first, &store.snapshot()));
        assert_eq!(first.current_streak, 1);
        assert_eq!(first.last_active_date, "2024-05-10");
    }

    #[test]
    fn streak_grows_on_consecutive_days_and_resets_after_gap() {
        let (_, clock, mut store) = setup();
        let mut longest_seen = 0;

        for expected in 1..=4 {
            store.update_streak();
            let s = store.snapshot();
            assert_eq!(s.current_streak, expected);
            assert!(s.longest_streak >= longest_seen);
            longest_seen = s.longest_streak;
            clock.advance_days(1);
        }

        clock.advance_days(2);
        store.update_streak();
        let s = store.snapshot();
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 4);
    }

    #[test]
    fn snapshots_are_not_mutated_in_place() {
        let (_, _, mut store) = setup();
        let before = store.snapshot();
        store.add_session(25);
        assert_eq!(before.total_pomodoros, 0);
        assert_eq!(store.snapshot().total_pomodoros, 1);
    }

    #[test]
    fn reset_restores_defaults_and_persists() {
        let (kv, clock, mut store) = setup();
        store.add_session(25);
        store.update_streak();
        store.reset_stats();
        assert_eq!(*store.snapshot(), UserStats::default());

        let reloaded = StatsStore::load(kv, clock);
        assert_eq!(*reloaded.snapshot(), UserStats::default());
    }

    #[test]
    fn state_survives_reload() {
        let (kv, clock, mut store) = setup();
        store.add_session(30);
        store.update_streak();

        let reloaded = StatsStore::load(kv.clone(), clock);
        assert_eq!(reloaded.snapshot(), store.snapshot());

        let raw = kv.get(STATS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"totalFocusTime\": 30"));
        assert!(raw.contains("\"lastActiveDate\": \"2024-05-10\""));
    }

    #[test]
    fn corrupted_record_loads_as_default() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(STATS_KEY, "[1, 2, \"oops\"").unwrap();
        let clock = Arc::new(FixedClock::at("2024-05-10T09:00:00+02:00"));
        let store = StatsStore::load(kv, clock);
        assert_eq!(*store.snapshot(), UserStats::default());
    }

    #[test]
    fn daily_entry_with_missing_counters_keeps_the_record() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(
            STATS_KEY,
            r#"{"totalPomodoros":40,"currentStreak":6,"longestStreak":9,
                "dailyStats":[{"date":"2024-05-09","totalPomodoros":4,"totalFocusTime":100}]}"#,
        )
        .unwrap();
        let clock = Arc::new(FixedClock::at("2024-05-10T09:00:00+02:00"));
        let store = StatsStore::load(kv, clock);

        let stats = store.snapshot();
        assert_eq!(stats.total_pomodoros, 40);
        assert_eq!(stats.current_streak, 6);
        assert_eq!(stats.longest_streak, 9);
        assert_eq!(
            stats.daily_stats,
            vec![DailyStat {
                date: "2024-05-09".into(),
                total_pomodoros: 4,
                total_focus_time: 100,
                tasks_completed: 0,
            }]
        );
    }

    #[test]
    fn export_of_empty_history_is_header_only() {
        let (_, _, store) = setup();
        assert_eq!(store.export_stats(), CSV_HEADER);
    }

    #[test]
    fn export_lists_days_oldest_first() {
        let (_, clock, mut store) = setup();
        store.add_session(25);
        clock.advance_days(1);
        store.add_session(15);
        store.increment_tasks_completed();

        let csv = store.export_stats();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![CSV_HEADER, "2024-05-10,1,25,0", "2024-05-11,1,15,1"]
        );
    }

    #[test]
    fn failed_write_keeps_in_memory_change() {
        let clock = Arc::new(FixedClock::at("2024-05-10T09:00:00+02:00"));
        let mut store = StatsStore::load(Arc::new(ReadOnlyStore), clock);
        let outcome = store.add_session(25);
        assert!(outcome.warning().is_some());
        assert_eq!(store.snapshot().total_pomodoros, 1);
    }

    #[test]
    fn mutex_wrapped_store_tracks_completions() {
        let (_, _, store) = setup();
        let shared = Mutex::new(store);
        shared.task_completed();
        assert_eq!(shared.lock().unwrap().snapshot().total_tasks_completed, 1);
    }
}
