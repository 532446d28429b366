// --------------------------------------------------
// Handles API endpoints for timer and sound settings.
// --------------------------------------------------

use axum::{Json, extract::State, response::Response};

use crate::app::{AppState, respond};
use crate::error::AppError;
use crate::models::{AppSettings, SettingsPatch, SoundSettingsPatch, TimerSettings, TimerSettingsPatch};

const MAX_VOLUME: u8 = 100;

fn validate_volume(volume: u8) -> Result<(), AppError> {
    if volume > MAX_VOLUME {
        return Err(AppError::InvalidArgument(format!("volume must be 0..={MAX_VOLUME}")));
    }
    Ok(())
}

fn validate_minutes(field: &str, value: u32) -> Result<(), AppError> {
    if value == 0 {
        return Err(AppError::InvalidArgument(format!("{field} must be >= 1")));
    }
    Ok(())
}

fn validate_timer(t: &TimerSettings) -> Result<(), AppError> {
    validate_minutes("workDuration", t.work_duration)?;
    validate_minutes("shortBreakDuration", t.short_break_duration)?;
    validate_minutes("longBreakDuration", t.long_break_duration)?;
    validate_minutes("sessionsUntilLongBreak", t.sessions_until_long_break)
}

// -----------------------------
// GET /api/settings
// -----------------------------
pub async fn get_settings(State(app): State<AppState>) -> Json<AppSettings> {
    Json((*app.settings().snapshot()).clone())
}

// -----------------------------
// PATCH /api/settings
// A timer or sound group given here replaces the stored one
// -----------------------------
pub async fn update_settings(
    State(app): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Response, AppError> {
    if let Some(timer) = &patch.timer {
        validate_timer(timer)?;
    }
    if let Some(sound) = &patch.sound {
        validate_volume(sound.volume)?;
    }

    let mut settings = app.settings();
    let outcome = settings.update_settings(patch);
    Ok(respond(&*settings.snapshot(), &[&outcome]))
}

// -----------------------------
// PATCH /api/settings/timer
// -----------------------------
pub async fn update_timer(
    State(app): State<AppState>,
    Json(patch): Json<TimerSettingsPatch>,
) -> Result<Response, AppError> {
    let mut settings = app.settings();

    let merged = patch.apply(&settings.snapshot().timer);
    validate_timer(&merged)?;

    let outcome = settings.update_timer_settings(patch);
    Ok(respond(&*settings.snapshot(), &[&outcome]))
}

// -----------------------------
// PATCH /api/settings/sound
// -----------------------------
pub async fn update_sound(
    State(app): State<AppState>,
    Json(patch): Json<SoundSettingsPatch>,
) -> Result<Response, AppError> {
    if let Some(volume) = patch.volume {
        validate_volume(volume)?;
    }

    let mut settings = app.settings();
    let outcome = settings.update_sound_settings(patch);
    Ok(respond(&*settings.snapshot(), &[&outcome]))
}

// -----------------------------
// POST /api/settings/reset
// -----------------------------
pub async fn reset_settings(State(app): State<AppState>) -> Response {
    let mut settings = app.settings();
    let outcome = settings.reset_settings();
    respond(&*settings.snapshot(), &[&outcome])
}
