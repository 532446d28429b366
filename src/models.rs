use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// Colour tags a task may carry. The first entry is the fallback for
// records written before tasks had a colour.
pub const TASK_COLORS: [&str; 7] = ["red", "orange", "yellow", "green", "blue", "purple", "pink"];

pub fn default_task_color() -> String {
    TASK_COLORS[0].to_string()
}

pub fn is_palette_color(color: &str) -> bool {
    TASK_COLORS.contains(&color)
}

// One calendar day of activity, keyed by "YYYY-MM-DD". Missing counters
// in an older entry read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStat {
    pub date: String,
    pub total_pomodoros: u32,
    pub total_focus_time: u32, // minutes
    pub tasks_completed: u32,
}

impl DailyStat {
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            total_pomodoros: 0,
            total_focus_time: 0,
            tasks_completed: 0,
        }
    }
}

// Cumulative statistics. Unknown or missing fields fall back to defaults
// when an older record is loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_pomodoros: u32,
    pub total_focus_time: u32, // minutes
    pub total_tasks_completed: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: String, // "" until the first active day
    pub daily_stats: Vec<DailyStat>, // oldest first, at most one entry per date
}

// A completed focus interval reported by the timer UI
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub duration: u32, // minutes
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub estimated_pomodoros: u32, // >= 1
    #[serde(default)]
    pub completed_pomodoros: u32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<FixedOffset>>, // Some iff is_completed
    #[serde(default = "default_task_color")]
    pub color: String,
    pub created_at: DateTime<FixedOffset>,
}

fn one() -> u32 {
    1
}

// Input for a new task; estimate and colour are optional
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default = "one")]
    pub estimated_pomodoros: u32,
    #[serde(default = "default_task_color")]
    pub color: String,
}

impl NewTask {
    #[cfg(test)]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            estimated_pomodoros: one(),
            color: default_task_color(),
        }
    }
}

// Field-level update for a task. Completion state is changed only
// through toggling, so completed_at stays consistent with is_completed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub estimated_pomodoros: Option<u32>,
    pub completed_pomodoros: Option<u32>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    pub work_duration: u32,        // minutes
    pub short_break_duration: u32, // minutes
    pub long_break_duration: u32,  // minutes
    pub sessions_until_long_break: u32,
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_until_long_break: 4,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    pub enabled: bool,
    pub volume: u8, // 0..=100
    pub selected_sound: String,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
            selected_sound: "bell".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub timer: TimerSettings,
    pub sound: SoundSettings,
}

// Top-level update: a group that is present replaces the stored group
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub timer: Option<TimerSettings>,
    pub sound: Option<SoundSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettingsPatch {
    pub work_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub sessions_until_long_break: Option<u32>,
    pub auto_start_breaks: Option<bool>,
    pub auto_start_pomodoros: Option<bool>,
}

impl TimerSettingsPatch {
    // Fields left out of the patch keep their current value
    pub fn apply(&self, current: &TimerSettings) -> TimerSettings {
        TimerSettings {
            work_duration: self.work_duration.unwrap_or(current.work_duration),
            short_break_duration: self
                .short_break_duration
                .unwrap_or(current.short_break_duration),
            long_break_duration: self
                .long_break_duration
                .unwrap_or(current.long_break_duration),
            sessions_until_long_break: self
                .sessions_until_long_break
                .unwrap_or(current.sessions_until_long_break),
            auto_start_breaks: self.auto_start_breaks.unwrap_or(current.auto_start_breaks),
            auto_start_pomodoros: self
                .auto_start_pomodoros
                .unwrap_or(current.auto_start_pomodoros),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSettingsPatch {
    pub enabled: Option<bool>,
    pub volume: Option<u8>,
    pub selected_sound: Option<String>,
}
