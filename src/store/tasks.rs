use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{info, warn};

use crate::error::{DaytaskError, Result};
use crate::model::{CategoryFilter, NewTask, Task, TaskPatch};
use crate::store::kv::{self, SharedKv};
use crate::task_id::TaskId;

/// Ordered task collection, most recently created first.
///
/// Every mutation persists the whole sequence before the in-memory copy is
/// replaced, so a failed write leaves the store exactly as it was.
pub struct TaskStore {
    kv: SharedKv,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub const KEY: &'static str = "tasks";

    /// Load the persisted tasks. Records whose completion flag and timestamp
    /// disagree are reset to incomplete; the fix is persisted by the next write.
    pub fn load(kv: SharedKv) -> Result<Self> {
        let mut tasks: Vec<Task> = kv::load_record(kv.as_ref(), Self::KEY)?.unwrap_or_default();
        for task in tasks.iter_mut().filter(|t| !t.is_consistent()) {
            warn!(
                id = %task.id,
                completed = task.completed,
                "resetting task with inconsistent completion state"
            );
            task.completed = false;
            task.completion_time = None;
        }
        Ok(Self { kv, tasks })
    }

    /// Create a task at the head of the list, stamped with `now`. The category
    /// label is taken as given; checking it against known categories is the
    /// caller's call.
    pub fn create(&mut self, new: NewTask, now: DateTime<FixedOffset>) -> Result<Task> {
        let title = non_empty_title(&new.title)?;
        let task = Task {
            id: TaskId::generate(),
            title,
            description: clean_description(new.description),
            category: new.category,
            due_date: new.due_date,
            time: new.time,
            completed: false,
            completion_time: None,
            created_at: now.with_timezone(&Utc),
        };

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task.clone());
        next.extend(self.tasks.iter().cloned());
        self.commit(next)?;
        info!(id = %task.id, category = %task.category, "created task");
        Ok(task)
    }

    /// Flip completion. Completing stamps `now`; un-completing clears the stamp.
    pub fn toggle_completion(&mut self, id: &TaskId, now: DateTime<FixedOffset>) -> Result<Task> {
        let updated = self.modify(id, |task| {
            task.completed = !task.completed;
            task.completion_time = task.completed.then_some(now);
            Ok(())
        })?;
        info!(id = %updated.id, completed = updated.completed, "toggled task");
        Ok(updated)
    }

    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        let title = patch.title.as_deref().map(non_empty_title).transpose()?;
        let updated = self.modify(id, move |task| {
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = clean_description(Some(description));
            }
            if let Some(category) = patch.category {
                task.category = category;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = Some(due_date);
            }
            if let Some(time) = patch.time {
                task.time = Some(time);
            }
            Ok(())
        })?;
        info!(id = %updated.id, "updated task");
        Ok(updated)
    }

    /// Remove a task. Deleting an id that is not present is a no-op.
    pub fn delete(&mut self, id: &TaskId) -> Result<Option<Task>> {
        let Some(pos) = self.position(id) else {
            return Ok(None);
        };
        let mut next = self.tasks.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        info!(id = %removed.id, "deleted task");
        Ok(Some(removed))
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn list(&self, filter: &CategoryFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Number of tasks completed on `today`. This is the streak engine's only input.
    pub fn completed_today(&self, today: NaiveDate) -> usize {
        completed_on(&self.tasks, today)
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == *id)
    }

    fn modify<F>(&mut self, id: &TaskId, apply: F) -> Result<Task>
    where
        F: FnOnce(&mut Task) -> Result<()>,
    {
        let pos = self.position(id).ok_or(DaytaskError::TaskNotFound(*id))?;
        let mut next = self.tasks.clone();
        let task = &mut next[pos];
        apply(task)?;
        let updated = task.clone();
        self.commit(next)?;
        Ok(updated)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        kv::save_record(self.kv.as_ref(), Self::KEY, &next)?;
        self.tasks = next;
        Ok(())
    }
}

/// Count tasks completed on `day`, judged by the calendar date of their completion stamp.
pub fn completed_on(tasks: &[Task], day: NaiveDate) -> usize {
    tasks.iter().filter(|t| t.is_completed_on(day)).count()
}

fn non_empty_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DaytaskError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
