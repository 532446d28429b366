// --------------------------------------------------
// Handles API endpoints for focus statistics.
//
// Responsibilities:
// - Read totals and today's numbers
// - Record finished focus sessions (and the streak)
// - Reset and CSV export
// --------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::app::{AppState, respond};
use crate::error::AppError;
use crate::models::{DailyStat, FocusSession, UserStats};
use crate::stats::StatsStore;
use crate::store::Persisted;
use crate::tasks::TasksStore;

// -----------------------------
// GET /api/stats
// -----------------------------
pub async fn get_stats(State(app): State<AppState>) -> Json<UserStats> {
    Json((*app.stats().snapshot()).clone())
}

// -----------------------------
// GET /api/stats/today
// Zeroed entry if nothing was recorded today
// -----------------------------
pub async fn get_today(State(app): State<AppState>) -> Json<DailyStat> {
    Json(app.stats().today_stats())
}

// Checks the task, records the session and counts it on the task while
// the caller holds the tasks lock, so the task cannot vanish in between.
fn record_session(
    tasks: &mut TasksStore,
    stats: &mut StatsStore,
    session: &FocusSession,
) -> Result<(Arc<UserStats>, [Persisted; 3]), AppError> {
    if let Some(id) = &session.task_id {
        if tasks.get(id).is_none() {
            return Err(AppError::NotFound(format!("task {id}")));
        }
    }

    let recorded = stats.add_session(session.duration);
    let streak = stats.update_streak();
    let counted = match &session.task_id {
        Some(id) => tasks.increment_task_pomodoro(id),
        None => Persisted::Unchanged,
    };

    Ok((stats.snapshot(), [recorded, streak, counted]))
}

// -----------------------------
// POST /api/stats/sessions
// Records a finished focus session and counts today as active.
// With a taskId, the pomodoro is also counted on that task.
// -----------------------------
pub async fn add_session(
    State(app): State<AppState>,
    Json(session): Json<FocusSession>,
) -> Result<Response, AppError> {
    if session.duration == 0 {
        return Err(AppError::InvalidArgument("duration must be at least 1 minute".into()));
    }

    // tasks before stats
    let mut tasks = app.tasks();
    let mut stats = app.stats();
    let (snapshot, [recorded, streak, counted]) =
        record_session(&mut tasks, &mut stats, &session)?;

    tracing::debug!(duration = session.duration, task = ?session.task_id, "session recorded");
    Ok(respond(&*snapshot, &[&recorded, &streak, &counted]))
}

// -----------------------------
// POST /api/stats/streak
// -----------------------------
pub async fn update_streak(State(app): State<AppState>) -> Response {
    let mut stats = app.stats();
    let outcome = stats.update_streak();
    respond(&*stats.snapshot(), &[&outcome])
}

// -----------------------------
// POST /api/stats/reset
// -----------------------------
pub async fn reset_stats(State(app): State<AppState>) -> Response {
    let mut stats = app.stats();
    let outcome = stats.reset_stats();
    respond(&*stats.snapshot(), &[&outcome])
}

// -----------------------------
// GET /api/stats/export
// Daily history as a CSV download
// -----------------------------
pub async fn export_stats(State(app): State<AppState>) -> Response {
    let csv = app.stats().export_stats();
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pomodoro-stats.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}
