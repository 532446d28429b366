// --------------------------------------------------
// Handles API endpoints related to the task list.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Toggle completion (counted in stats when completed)
// - Count pomodoros, clear completed tasks, reorder
// -------------------------------------------------

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::app::{AppState, respond};
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskPatch, is_palette_color};
use crate::store::Persisted;
use crate::tasks::TasksStore;

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidArgument("title required".into()));
    }
    Ok(())
}

fn validate_estimate(n: u32) -> Result<(), AppError> {
    if n == 0 {
        return Err(AppError::InvalidArgument("estimatedPomodoros must be >= 1".into()));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), AppError> {
    if !is_palette_color(color) {
        return Err(AppError::InvalidArgument(format!("unknown color: {color}")));
    }
    Ok(())
}

fn require_task(tasks: &TasksStore, id: &str) -> Result<(), AppError> {
    match tasks.get(id) {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("task {id}"))),
    }
}

// Respond with the whole list after a mutation
fn list_response(tasks: &TasksStore, outcome: &Persisted) -> Response {
    respond(&*tasks.snapshot(), &[outcome])
}

// Respond with one task after a mutation
fn task_response(tasks: &TasksStore, id: &str, outcome: &Persisted) -> Result<Response, AppError> {
    let task: Task = tasks
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("task {id}")))?;
    Ok(respond(task, &[outcome]))
}

// -----------------------------
// GET /api/tasks
// Returns the list in display order
// -----------------------------
pub async fn get_tasks(State(app): State<AppState>) -> Json<Vec<Task>> {
    Json((*app.tasks().snapshot()).clone())
}

// -----------------------------
// POST /api/tasks
// Appends a new task to the end of the list
// -----------------------------
pub async fn create_task(
    State(app): State<AppState>,
    Json(input): Json<NewTask>,
) -> Result<Response, AppError> {
    validate_title(&input.title)?;
    validate_estimate(input.estimated_pomodoros)?;
    validate_color(&input.color)?;

    let (task, outcome) = app.tasks().add_task(input);
    tracing::debug!(id = %task.id, "task created");
    Ok(respond(task, &[&outcome]))
}

// -----------------------------
// PATCH /api/tasks/:id
// Merges the given fields into an existing task
// ----------------------------
pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Response, AppError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(n) = patch.estimated_pomodoros {
        validate_estimate(n)?;
    }
    if let Some(color) = &patch.color {
        validate_color(color)?;
    }

    let mut tasks = app.tasks();
    require_task(&tasks, &id)?;
    let outcome = tasks.update_task(&id, patch);
    task_response(&tasks, &id, &outcome)
}

// -----------------------------
// DELETE /api/tasks/:id
// -----------------------------
pub async fn delete_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut tasks = app.tasks();
    require_task(&tasks, &id)?;
    let outcome = tasks.delete_task(&id);
    Ok(list_response(&tasks, &outcome))
}

// -----------------------------
// POST /api/tasks/:id/toggle
// Open <-> completed
// -----------------------------
pub async fn toggle_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut tasks = app.tasks();
    require_task(&tasks, &id)?;
    let outcome = tasks.toggle_task_complete(&id);
    task_response(&tasks, &id, &outcome)
}

// -----------------------------
// POST /api/tasks/:id/pomodoro
// -----------------------------
pub async fn increment_pomodoro(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut tasks = app.tasks();
    require_task(&tasks, &id)?;
    let outcome = tasks.increment_task_pomodoro(&id);
    task_response(&tasks, &id, &outcome)
}

// -----------------------------
// POST /api/tasks/clear-completed
// -----------------------------
pub async fn clear_completed(State(app): State<AppState>) -> Response {
    let mut tasks = app.tasks();
    let outcome = tasks.clear_completed_tasks();
    list_response(&tasks, &outcome)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderInput {
    pub start_index: usize,
    pub end_index: usize,
}

// -----------------------------
// POST /api/tasks/reorder
// Moves one task; indices are 0-based positions in the current list
// -----------------------------
pub async fn reorder_tasks(
    State(app): State<AppState>,
    Json(input): Json<ReorderInput>,
) -> Result<Response, AppError> {
    let mut tasks = app.tasks();
    let outcome = tasks.reorder_tasks(input.start_index, input.end_index)?;
    Ok(list_response(&tasks, &outcome))
}
