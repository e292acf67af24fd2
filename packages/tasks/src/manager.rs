// ABOUTME: Task lifecycle controller owning the in-memory task cache
// ABOUTME: Coordinates storage, recurrence regeneration, reminders and the recency buffer

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tasklane_core::{
    RecentTaskMeta, Task, TaskCreateInput, TaskStatus, TaskUpdateInput,
};
use tasklane_recurrence::next_occurrence;
use tasklane_reminders::ReminderScheduler;
use tasklane_storage::{push_recent, RecentMetaStore, TaskStorage};
use tracing::{debug, info, warn};

use crate::error::{ManagerError, ManagerResult};
use crate::filter::TaskFilter;

/// Single owner of the task cache. All task mutations go through here so the
/// cache, the store, the reminder timers and the recency buffer stay in step.
pub struct TaskManager {
    storage: TaskStorage,
    reminders: Arc<ReminderScheduler>,
    recent_store: RecentMetaStore,
    tasks: Vec<Task>,
    filters: TaskFilter,
    selected: Option<String>,
    recent: Vec<RecentTaskMeta>,
    last_error: Option<String>,
}

impl TaskManager {
    pub async fn new(
        storage: TaskStorage,
        reminders: Arc<ReminderScheduler>,
        recent_store: RecentMetaStore,
    ) -> Self {
        let recent = recent_store.load().await;
        Self {
            storage,
            reminders,
            recent_store,
            tasks: Vec::new(),
            filters: TaskFilter::default(),
            selected: None,
            recent,
            last_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn recent_meta(&self) -> &[RecentTaskMeta] {
        &self.recent
    }

    /// Message of the most recent failed operation, cleared when the next one starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(&mut self, result: ManagerResult<T>) -> ManagerResult<T> {
        if let Err(e) = &result {
            warn!("Task operation failed: {}", e);
            self.last_error = Some(e.to_string());
        }
        result
    }

    /// Replace the cache with the owner's tasks and re-arm every reminder.
    ///
    /// On failure the cache is left empty.
    pub async fn load(&mut self, owner_id: Option<&str>) -> ManagerResult<()> {
        self.last_error = None;
        debug!("Loading tasks (owner: {:?})", owner_id);

        match self.storage.list(owner_id).await {
            Ok(mut tasks) => {
                sort_tasks(&mut tasks);
                self.reminders.reschedule_all(&tasks).await;
                self.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                self.tasks.clear();
                self.record(Err(e.into()))
            }
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub async fn create(
        &mut self,
        input: TaskCreateInput,
        owner_id: Option<&str>,
    ) -> ManagerResult<Task> {
        self.last_error = None;
        let result = self.create_inner(input, owner_id).await;
        self.record(result)
    }

    async fn create_inner(
        &mut self,
        mut input: TaskCreateInput,
        owner_id: Option<&str>,
    ) -> ManagerResult<Task> {
        input.next_occurrence = match (&input.recurrence_rule, input.due_date) {
            (Some(rule), Some(due)) => next_occurrence(rule, due, due),
            _ => None,
        };

        let task = self.storage.create(input, owner_id).await?;
        debug!("Created task {} (order: {})", task.id, task.order);

        self.reminders.schedule(&task).await;
        self.tasks.push(task.clone());
        self.remember(&task).await;
        Ok(task)
    }

    pub async fn update(&mut self, task_id: &str, input: TaskUpdateInput) -> ManagerResult<Task> {
        self.last_error = None;
        let result = self.update_inner(task_id, input).await;
        self.record(result)
    }

    async fn update_inner(
        &mut self,
        task_id: &str,
        mut input: TaskUpdateInput,
    ) -> ManagerResult<Task> {
        let existing = self
            .get(task_id)
            .ok_or_else(|| ManagerError::task_not_found(task_id))?;

        let mut merged = existing.clone();
        merged.apply(&input);

        // Keep the cached next occurrence derived from the rule and due date
        input.next_occurrence = Some(match (&merged.recurrence_rule, merged.due_date) {
            (Some(rule), Some(due)) => next_occurrence(rule, due, due),
            _ => None,
        });

        // completedAt is set exactly while the task is completed
        if merged.status == TaskStatus::Completed {
            if merged.completed_at.is_none() {
                input.completed_at = Some(Some(Utc::now()));
            }
        } else if merged.completed_at.is_some() {
            input.completed_at = Some(None);
        }

        let updated = self.persist(task_id, &input).await?;
        self.remember(&updated).await;
        Ok(updated)
    }

    /// Write an update through to storage, the cache and the reminder timer.
    async fn persist(&mut self, task_id: &str, input: &TaskUpdateInput) -> ManagerResult<Task> {
        let updated = self.storage.update(task_id, input).await?;

        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = updated.clone();
        }
        self.reminders.schedule(&updated).await;
        Ok(updated)
    }

    /// Delete a task and its subtasks, cancelling every affected reminder.
    ///
    /// Returns the ids that were removed.
    pub async fn delete(&mut self, task_id: &str) -> ManagerResult<Vec<String>> {
        self.last_error = None;

        let deleted = match self.storage.delete(task_id).await {
            Ok(deleted) => deleted,
            Err(e) => return self.record(Err(e.into())),
        };

        for id in &deleted {
            self.reminders.cancel(id);
        }
        self.tasks.retain(|t| !deleted.contains(&t.id));
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| deleted.contains(selected))
        {
            self.selected = None;
        }

        debug!("Deleted {} task(s) rooted at {}", deleted.len(), task_id);
        Ok(deleted)
    }

    /// Mark a task completed. When it recurs and has a due date, a fresh
    /// successor is created for the next occurrence after that due date.
    ///
    /// Returns the successor, if one was created. Missing or already-completed
    /// tasks are left alone.
    pub async fn complete(&mut self, task_id: &str) -> ManagerResult<Option<Task>> {
        self.last_error = None;

        let task = match self.get(task_id) {
            Some(task) if task.status != TaskStatus::Completed => task.clone(),
            _ => return Ok(None),
        };

        let input = TaskUpdateInput {
            status: Some(TaskStatus::Completed),
            completed_at: Some(Some(Utc::now())),
            next_occurrence: Some(None),
            ..Default::default()
        };
        let result = self.persist(task_id, &input).await;
        let completed = self.record(result)?;
        self.remember(&completed).await;
        info!("Completed task {}", task_id);

        let (rule, due) = match (&task.recurrence_rule, task.due_date) {
            (Some(rule), Some(due)) => (rule, due),
            _ => return Ok(None),
        };

        // Follow the original due-date chain, not the completion time
        let next_due = match next_occurrence(rule, due, due) {
            Some(next_due) => next_due,
            None => {
                info!("Recurrence for task {} is exhausted", task_id);
                return Ok(None);
            }
        };

        let successor = TaskCreateInput {
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(TaskStatus::Pending),
            priority: Some(task.priority),
            due_date: Some(next_due),
            // Same lead time before the due date as the completed instance
            reminder_date: task.reminder_date.map(|reminder| reminder + (next_due - due)),
            parent_task_id: None,
            tag_ids: task.tag_ids.clone(),
            project_id: task.project_id.clone(),
            order: Some(task.order),
            recurrence_rule: task.recurrence_rule.clone(),
            next_occurrence: None,
        };

        let created = self.create(successor, task.owner_id.as_deref()).await?;
        info!("Regenerated task {} as {} due {}", task_id, created.id, next_due);
        Ok(Some(created))
    }

    /// Move a completed task back to pending. Successors spawned by the earlier
    /// completion are kept.
    pub async fn uncomplete(&mut self, task_id: &str) -> ManagerResult<()> {
        match self.get(task_id) {
            Some(task) if task.status == TaskStatus::Completed => {}
            _ => return Ok(()),
        }

        self.update(
            task_id,
            TaskUpdateInput {
                status: Some(TaskStatus::Pending),
                completed_at: Some(None),
                ..Default::default()
            },
        )
        .await?;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filters.merge(filter);
    }

    pub fn clear_filters(&mut self) {
        self.filters = TaskFilter::default();
    }

    pub fn filters(&self) -> &TaskFilter {
        &self.filters
    }

    /// Cached tasks passing every active filter, in cache order
    pub fn filtered(&self) -> Vec<&Task> {
        self.filters.apply(&self.tasks)
    }

    /// Persist `task_ids` as the manual order and renumber the cache: listed
    /// tasks take their position, the rest follow in their previous order.
    pub async fn reorder(&mut self, task_ids: &[String]) -> ManagerResult<()> {
        self.last_error = None;

        if let Err(e) = self.storage.reorder(task_ids).await {
            return self.record(Err(e.into()));
        }

        let mut reordered: Vec<Task> = Vec::with_capacity(self.tasks.len());
        for (index, id) in task_ids.iter().enumerate() {
            if reordered.iter().any(|t| &t.id == id) {
                continue;
            }
            if let Some(task) = self.get(id) {
                let mut task = task.clone();
                task.order = index as i64;
                reordered.push(task);
            }
        }

        let max_order = reordered.iter().map(|t| t.order).max().unwrap_or(-1);
        let remaining = self.tasks.iter().filter(|t| !task_ids.contains(&t.id));
        for (offset, task) in remaining.enumerate() {
            let mut task = task.clone();
            task.order = max_order + 1 + offset as i64;
            reordered.push(task);
        }

        self.tasks = reordered;
        Ok(())
    }

    /// Move one task to `new_index` in the cached sequence and persist the result.
    pub async fn move_task(&mut self, task_id: &str, new_index: usize) -> ManagerResult<()> {
        let position = match self.tasks.iter().position(|t| t.id == task_id) {
            Some(position) => position,
            None => return Ok(()),
        };

        let mut ids: Vec<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        let moved = ids.remove(position);
        ids.insert(new_index.min(ids.len()), moved);

        self.reorder(&ids).await
    }

    pub fn select(&mut self, task_id: Option<&str>) {
        self.selected = task_id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<&Task> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn subtasks(&self, parent_task_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.parent_task_id.as_deref() == Some(parent_task_id))
            .collect()
    }

    /// Active tasks past their due date, read from the store
    pub async fn overdue(&mut self, owner_id: Option<&str>) -> ManagerResult<Vec<Task>> {
        let result = self.storage.list_overdue(owner_id).await.map_err(Into::into);
        self.record(result)
    }

    /// Active tasks due today, read from the store
    pub async fn due_today(&mut self, owner_id: Option<&str>) -> ManagerResult<Vec<Task>> {
        let result = self.storage.list_due_today(owner_id).await.map_err(Into::into);
        self.record(result)
    }

    /// Drop a deleted tag from the cached tasks. The store is updated by the
    /// tag adapter; this only keeps the cache consistent with it.
    pub fn forget_tag(&mut self, tag_id: &str) {
        for task in &mut self.tasks {
            task.tag_ids.retain(|t| t != tag_id);
        }
    }

    /// Back to a freshly constructed state: empty cache, no filters or
    /// selection, no armed reminders, recency buffer reloaded from disk.
    pub async fn reset(&mut self) {
        self.reminders.cancel_all();
        self.tasks.clear();
        self.filters = TaskFilter::default();
        self.selected = None;
        self.last_error = None;
        self.recent = self.recent_store.load().await;
    }

    async fn remember(&mut self, task: &Task) {
        push_recent(&mut self.recent, RecentTaskMeta::from_task(task, Utc::now()));
        self.recent_store.save(&self.recent).await;
    }
}

/// Manual order first, then due date (dated before undated), then creation time.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tasklane_core::TaskPriority;

    fn task(id: &str, order: i64, due_in_days: Option<i64>, created_offset: i64) -> Task {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            owner_id: None,
            title: id.to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: due_in_days.map(|d| base + Duration::days(d)),
            completed_at: None,
            reminder_date: None,
            parent_task_id: None,
            tag_ids: Vec::new(),
            project_id: None,
            order,
            recurrence_rule: None,
            next_occurrence: None,
            created_at: base + Duration::minutes(created_offset),
            updated_at: base,
        }
    }

    #[test]
    fn test_sort_order_then_due_then_created() {
        let mut tasks = vec![
            task("late-order", 1, Some(0), 0),
            task("undated-old", 0, None, 0),
            task("dated-later", 0, Some(3), 5),
            task("dated-sooner", 0, Some(1), 9),
            task("undated-new", 0, None, 1),
        ];

        sort_tasks(&mut tasks);

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["dated-sooner", "dated-later", "undated-old", "undated-new", "late-order"]
        );
    }
}
