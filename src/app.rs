// --------------------------------------------------
// Shared application state and the API router.
//
// Each store is loaded once at startup and handed to the
// handlers through AppState. Lock order: tasks before stats
// (completing a task calls into the stats store).
// --------------------------------------------------

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::{
    Json, Router,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::clock::Clock;
use crate::settings::SettingsStore;
use crate::stats::StatsStore;
use crate::store::{KeyValueStore, Persisted};
use crate::tasks::TasksStore;
use crate::{routes_settings, routes_stats, routes_tasks};

// Set on a successful response whose change could not be written to disk
pub const PERSIST_WARNING: &str = "x-persist-warning";

#[derive(Clone)]
pub struct AppState {
    stats: Arc<Mutex<StatsStore>>,
    tasks: Arc<Mutex<TasksStore>>,
    settings: Arc<Mutex<SettingsStore>>,
}

impl AppState {
    pub fn load(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let stats = Arc::new(Mutex::new(StatsStore::load(kv.clone(), clock.clone())));
        let tasks = TasksStore::load(kv.clone(), clock, stats.clone());
        let settings = SettingsStore::load(kv);

        Self {
            stats,
            tasks: Arc::new(Mutex::new(tasks)),
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    pub fn stats(&self) -> MutexGuard<'_, StatsStore> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tasks(&self) -> MutexGuard<'_, TasksStore> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> MutexGuard<'_, SettingsStore> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// JSON body, plus a warning header if any of the writes failed.
pub fn respond<T: Serialize>(body: T, outcomes: &[&Persisted]) -> Response {
    let mut res = Json(body).into_response();

    let warnings: Vec<String> = outcomes.iter().filter_map(|o| o.warning()).collect();
    if !warnings.is_empty() {
        let value = HeaderValue::from_str(&warnings.join("; "))
            .unwrap_or_else(|_| HeaderValue::from_static("write failed"));
        res.headers_mut().insert(PERSIST_WARNING, value);
    }

    res
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    let api = Router::new()
        // stats
        .route("/stats", get(routes_stats::get_stats))
        .route("/stats/today", get(routes_stats::get_today))
        .route("/stats/sessions", post(routes_stats::add_session))
        .route("/stats/streak", post(routes_stats::update_streak))
        .route("/stats/reset", post(routes_stats::reset_stats))
        .route("/stats/export", get(routes_stats::export_stats))
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route("/tasks/reorder", post(routes_tasks::reorder_tasks))
        .route("/tasks/clear-completed", post(routes_tasks::clear_completed))
        .route("/tasks/:id", patch(routes_tasks::update_task).delete(routes_tasks::delete_task))
        .route("/tasks/:id/toggle", post(routes_tasks::toggle_task))
        .route("/tasks/:id/pomodoro", post(routes_tasks::increment_pomodoro))
        // settings
        .route("/settings", get(routes_settings::get_settings).patch(routes_settings::update_settings))
        .route("/settings/timer", patch(routes_settings::update_timer))
        .route("/settings/sound", patch(routes_settings::update_sound))
        .route("/settings/reset", post(routes_settings::reset_settings))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .nest_service("/", ServeDir::new(static_dir))
}
