//! Timer and sound preferences.

use std::sync::Arc;

use crate::models::{AppSettings, SettingsPatch, SoundSettingsPatch, TimerSettingsPatch};
use crate::store::{self, KeyValueStore, Persisted};

pub const SETTINGS_KEY: &str = "pomodoro-settings";

pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
    settings: Arc<AppSettings>,
}

impl SettingsStore {
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let settings: AppSettings = store::load_or_default(kv.as_ref(), SETTINGS_KEY);
        Self {
            kv,
            settings: Arc::new(settings),
        }
    }

    pub fn snapshot(&self) -> Arc<AppSettings> {
        Arc::clone(&self.settings)
    }

    /// Replace whole groups; a group given here is not merged field by field.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Persisted {
        let mut next = (*self.settings).clone();
        if let Some(timer) = patch.timer {
            next.timer = timer;
        }
        if let Some(sound) = patch.sound {
            next.sound = sound;
        }
        self.commit(next)
    }

    pub fn update_timer_settings(&mut self, patch: TimerSettingsPatch) -> Persisted {
        let mut next = (*self.settings).clone();
        next.timer = patch.apply(&next.timer);
        self.commit(next)
    }

    pub fn update_sound_settings(&mut self, patch: SoundSettingsPatch) -> Persisted {
        let mut next = (*self.settings).clone();
        let sound = &mut next.sound;

        if let Some(v) = patch.enabled {
            sound.enabled = v;
        }
        if let Some(v) = patch.volume {
            sound.volume = v;
        }
        if let Some(v) = patch.selected_sound {
            sound.selected_sound = v;
        }

        self.commit(next)
    }

    pub fn reset_settings(&mut self) -> Persisted {
        tracing::info!("resetting settings");
        self.commit(AppSettings::default())
    }

    fn commit(&mut self, next: AppSettings) -> Persisted {
        self.settings = Arc::new(next);
        store::save(self.kv.as_ref(), SETTINGS_KEY, self.settings.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SoundSettings, TimerSettings};
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, SettingsStore) {
        let kv = Arc::new(MemoryStore::new());
        let store = SettingsStore::load(kv.clone());
        (kv, store)
    }

    #[test]
    fn defaults_when_nothing_stored() {
        let (_, store) = setup();
        let s = store.snapshot();
        assert_eq!(s.timer.work_duration, 25);
        assert_eq!(s.timer.short_break_duration, 5);
        assert_eq!(s.timer.long_break_duration, 15);
        assert_eq!(s.timer.sessions_until_long_break, 4);
        assert!(s.sound.enabled);
    }

    #[test]
    fn shallow_update_replaces_whole_group() {
        let (_, mut store) = setup();
        store.update_timer_settings(TimerSettingsPatch {
            auto_start_breaks: Some(true),
            ..Default::default()
        });

        store.update_settings(SettingsPatch {
            timer: Some(TimerSettings {
                work_duration: 50,
                ..TimerSettings::default()
            }),
            sound: None,
        });

        let s = store.snapshot();
        assert_eq!(s.timer.work_duration, 50);
        // not carried over from the previous timer group
        assert!(!s.timer.auto_start_breaks);
        assert_eq!(s.sound, SoundSettings::default());
    }

    #[test]
    fn timer_update_leaves_other_fields() {
        let (_, mut store) = setup();
        store.update_sound_settings(SoundSettingsPatch {
            volume: Some(80),
            ..Default::default()
        });
        store.update_timer_settings(TimerSettingsPatch {
            short_break_duration: Some(10),
            ..Default::default()
        });

        let s = store.snapshot();
        assert_eq!(s.timer.short_break_duration, 10);
        assert_eq!(s.timer.work_duration, 25);
        assert_eq!(s.sound.volume, 80);
    }

    #[test]
    fn sound_update_leaves_timer_untouched() {
        let (_, mut store) = setup();
        store.update_sound_settings(SoundSettingsPatch {
            enabled: Some(false),
            selected_sound: Some("chime".into()),
            ..Default::default()
        });

        let s = store.snapshot();
        assert!(!s.sound.enabled);
        assert_eq!(s.sound.selected_sound, "chime");
        assert_eq!(s.sound.volume, 50);
        assert_eq!(s.timer, TimerSettings::default());
    }

    #[test]
    fn partial_record_merges_onto_defaults() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(SETTINGS_KEY, r#"{"timer": {"workDuration": 45}, "theme": "dark"}"#)
            .unwrap();
        let store = SettingsStore::load(kv);
        let s = store.snapshot();
        assert_eq!(s.timer.work_duration, 45);
        assert_eq!(s.timer.long_break_duration, 15);
        assert_eq!(s.sound, SoundSettings::default());
    }

    #[test]
    fn corrupted_record_loads_as_default() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(SETTINGS_KEY, "\u{0}garbage").unwrap();
        let store = SettingsStore::load(kv);
        assert_eq!(*store.snapshot(), AppSettings::default());
    }

    #[test]
    fn changes_persist_and_reset_restores_defaults() {
        let (kv, mut store) = setup();
        store.update_timer_settings(TimerSettingsPatch {
            work_duration: Some(30),
            ..Default::default()
        });
        assert_eq!(
            SettingsStore::load(kv.clone()).snapshot().timer.work_duration,
            30
        );

        assert!(store.reset_settings().is_saved());
        assert_eq!(*SettingsStore::load(kv).snapshot(), AppSettings::default());
    }
}
