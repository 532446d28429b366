//! The user's ordered task list.

use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::Result;
use crate::logic;
use crate::models::{NewTask, Task, TaskPatch, default_task_color};
use crate::store::{self, KeyValueStore, Persisted};

pub const TASKS_KEY: &str = "pomodoro-tasks";

/// Notified once each time a task goes from open to completed.
pub trait CompletionTracker: Send + Sync {
    fn task_completed(&self);
}

pub struct TasksStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    tracker: Arc<dyn CompletionTracker>,
    tasks: Arc<Vec<Task>>,
}

impl TasksStore {
    /// Load the stored list; a missing or malformed record gives an empty list.
    pub fn load(
        kv: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        tracker: Arc<dyn CompletionTracker>,
    ) -> Self {
        let mut tasks: Vec<Task> = store::load_or_default(kv.as_ref(), TASKS_KEY);
        for t in &mut tasks {
            if t.color.is_empty() {
                t.color = default_task_color();
            }
        }
        tracing::debug!(count = tasks.len(), "tasks loaded");

        Self {
            kv,
            clock,
            tracker,
            tasks: Arc::new(tasks),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a new open task at the end of the list.
    pub fn add_task(&mut self, input: NewTask) -> (Task, Persisted) {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            estimated_pomodoros: input.estimated_pomodoros,
            completed_pomodoros: 0,
            is_completed: false,
            completed_at: None,
            color: input.color,
            created_at: self.clock.now(),
        };

        let mut next = (*self.tasks).clone();
        next.push(task.clone());
        (task, self.commit(next))
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Persisted {
        self.modify(id, |t| {
            if let Some(title) = patch.title {
                t.title = title;
            }
            if let Some(n) = patch.estimated_pomodoros {
                t.estimated_pomodoros = n;
            }
            if let Some(n) = patch.completed_pomodoros {
                t.completed_pomodoros = n;
            }
            if let Some(color) = patch.color {
                t.color = color;
            }
        })
    }

    pub fn delete_task(&mut self, id: &str) -> Persisted {
        if self.get(id).is_none() {
            return Persisted::Unchanged;
        }
        let next = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(next)
    }

    /// Flip completion. Completing a task reports it to the tracker;
    /// reopening clears the timestamp but is not reported.
    pub fn toggle_task_complete(&mut self, id: &str) -> Persisted {
        let now = self.clock.now();
        let mut completed = false;

        let outcome = self.modify(id, |t| {
            t.is_completed = !t.is_completed;
            if t.is_completed {
                t.completed_at = Some(now);
                completed = true;
            } else {
                t.completed_at = None;
            }
        });

        if completed {
            self.tracker.task_completed();
        }
        outcome
    }

    // No cap at the estimate; a task may take more pomodoros than planned.
    pub fn increment_task_pomodoro(&mut self, id: &str) -> Persisted {
        self.modify(id, |t| {
            t.completed_pomodoros = t.completed_pomodoros.saturating_add(1);
        })
    }

    pub fn clear_completed_tasks(&mut self) -> Persisted {
        if !self.tasks.iter().any(|t| t.is_completed) {
            return Persisted::Unchanged;
        }
        let next = self.tasks.iter().filter(|t| !t.is_completed).cloned().collect();
        self.commit(next)
    }

    /// Move the task at `start_index` to `end_index`. Both must be
    /// positions in the current list.
    pub fn reorder_tasks(&mut self, start_index: usize, end_index: usize) -> Result<Persisted> {
        let mut next = (*self.tasks).clone();
        logic::move_item(&mut next, start_index, end_index)?;
        if start_index == end_index {
            return Ok(Persisted::Unchanged);
        }
        Ok(self.commit(next))
    }

    // Apply `f` to a copy of the matching task; unknown ids change nothing.
    fn modify(&mut self, id: &str, f: impl FnOnce(&mut Task)) -> Persisted {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return Persisted::Unchanged;
        };
        let mut next = (*self.tasks).clone();
        f(&mut next[idx]);
        self.commit(next)
    }

    fn commit(&mut self, next: Vec<Task>) -> Persisted {
        self.tasks = Arc::new(next);
        store::save(self.kv.as_ref(), TASKS_KEY, self.tasks.as_ref())
    }
}
