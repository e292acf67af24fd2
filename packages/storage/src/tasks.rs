// ABOUTME: Task storage layer using SQLite
// ABOUTME: CRUD, indexed queries, cascade delete and manual ordering for tasks

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use tasklane_core::{
    day_bounds, dedup_ids, generate_task_id, validate_task_create, validate_task_update,
    RecurrenceRule, Task, TaskCreateInput, TaskStatus, TaskUpdateInput,
};

use crate::{StorageError, StorageResult};

const ACTIVE_STATUSES: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::InProgress];

#[derive(Clone)]
pub struct TaskStorage {
    pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks, optionally scoped to one owner (uses the owner index).
    pub async fn list(&self, owner_id: Option<&str>) -> StorageResult<Vec<Task>> {
        debug!("Fetching tasks (owner: {:?})", owner_id);

        let mut query = String::from("SELECT * FROM tasks");
        if owner_id.is_some() {
            query.push_str(" WHERE owner_id = ?");
        }
        query.push_str(" ORDER BY sort_order, created_at");

        let mut q = sqlx::query(&query);
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        rows.iter().map(row_to_task).collect()
    }

    pub async fn get(&self, task_id: &str) -> StorageResult<Option<Task>> {
        debug!("Fetching task: {}", task_id);

        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_task).transpose()
    }

    /// Tasks with any of the given statuses. With an owner this is served by the
    /// compound `(owner_id, status)` index, otherwise by the status index.
    pub async fn list_by_statuses(
        &self,
        statuses: &[TaskStatus],
        owner_id: Option<&str>,
    ) -> StorageResult<Vec<Task>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Fetching tasks by status {:?} (owner: {:?})", statuses, owner_id);

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let mut query = format!("SELECT * FROM tasks WHERE status IN ({})", placeholders);
        if owner_id.is_some() {
            query.push_str(" AND owner_id = ?");
        }
        query.push_str(" ORDER BY sort_order, created_at");

        let mut q = sqlx::query(&query);
        for status in statuses {
            q = q.bind(status.as_str());
        }
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        rows.iter().map(row_to_task).collect()
    }

    pub async fn list_by_status(
        &self,
        status: TaskStatus,
        owner_id: Option<&str>,
    ) -> StorageResult<Vec<Task>> {
        self.list_by_statuses(&[status], owner_id).await
    }

    /// Tasks carrying any of the given tags.
    ///
    /// No index covers tag membership, so this is a full O(n) scan of the collection.
    pub async fn list_by_tags(&self, tag_ids: &[String]) -> StorageResult<Vec<Task>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Scanning tasks for tags: {:?}", tag_ids);

        let tasks = self.list(None).await?;
        Ok(tasks
            .into_iter()
            .filter(|task| tag_ids.iter().any(|tag| task.has_tag(tag)))
            .collect())
    }

    pub async fn list_subtasks(&self, parent_task_id: &str) -> StorageResult<Vec<Task>> {
        debug!("Fetching subtasks for parent: {}", parent_task_id);

        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE parent_task_id = ? ORDER BY sort_order, created_at",
        )
        .bind(parent_task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_task).collect()
    }

    /// Active (pending or in-progress) tasks whose due date falls in `[from, before)`.
    /// A missing lower bound means "any time before".
    ///
    /// Overdue and due-today both go through here so the predicate lives in one place.
    async fn list_active_due(
        &self,
        from: Option<DateTime<Utc>>,
        before: DateTime<Utc>,
        owner_id: Option<&str>,
    ) -> StorageResult<Vec<Task>> {
        let mut query = String::from(
            "SELECT * FROM tasks WHERE due_date IS NOT NULL AND due_date < ? AND status IN (?, ?)",
        );
        if from.is_some() {
            query.push_str(" AND due_date >= ?");
        }
        if owner_id.is_some() {
            query.push_str(" AND owner_id = ?");
        }
        query.push_str(" ORDER BY due_date, sort_order");

        let mut q = sqlx::query(&query).bind(before);
        for status in ACTIVE_STATUSES {
            q = q.bind(status.as_str());
        }
        if let Some(from) = from {
            q = q.bind(from);
        }
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(StorageError::Sqlx)?;
        rows.iter().map(row_to_task).collect()
    }

    /// Active tasks due strictly before `now`.
    pub async fn list_overdue_at(
        &self,
        owner_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<Task>> {
        debug!("Fetching overdue tasks at {} (owner: {:?})", now, owner_id);
        self.list_active_due(None, now, owner_id).await
    }

    pub async fn list_overdue(&self, owner_id: Option<&str>) -> StorageResult<Vec<Task>> {
        self.list_overdue_at(owner_id, Utc::now()).await
    }

    /// Active tasks due within the (UTC) day containing `now`.
    pub async fn list_due_on(
        &self,
        owner_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<Task>> {
        let (start, end) = day_bounds(now);
        debug!("Fetching tasks due between {} and {} (owner: {:?})", start, end, owner_id);
        self.list_active_due(Some(start), end, owner_id).await
    }

    pub async fn list_due_today(&self, owner_id: Option<&str>) -> StorageResult<Vec<Task>> {
        self.list_due_on(owner_id, Utc::now()).await
    }

    /// Highest `order` among an owner's tasks, or -1 when there are none.
    pub async fn max_order(&self, owner_id: Option<&str>) -> StorageResult<i64> {
        let mut query = String::from("SELECT MAX(sort_order) FROM tasks");
        if owner_id.is_some() {
            query.push_str(" WHERE owner_id = ?");
        }

        let mut q = sqlx::query_scalar::<_, Option<i64>>(&query);
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }

        let max = q.fetch_one(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(max.unwrap_or(-1))
    }

    /// Create a task, filling in id, timestamps and (when unset) the next order slot.
    pub async fn create(
        &self,
        input: TaskCreateInput,
        owner_id: Option<&str>,
    ) -> StorageResult<Task> {
        validate_task_create(&input)?;

        let now = Utc::now();
        let order = match input.order {
            Some(order) => order,
            None => self.max_order(owner_id).await? + 1,
        };

        let status = input.status.unwrap_or(TaskStatus::Pending);
        let task = Task {
            id: generate_task_id(),
            owner_id: owner_id.map(str::to_string),
            title: input.title,
            description: input.description,
            status,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            completed_at: (status == TaskStatus::Completed).then_some(now),
            reminder_date: input.reminder_date,
            parent_task_id: input.parent_task_id,
            tag_ids: dedup_ids(&input.tag_ids),
            project_id: input.project_id,
            order,
            next_occurrence: input.recurrence_rule.as_ref().and(input.next_occurrence),
            recurrence_rule: input.recurrence_rule,
            created_at: now,
            updated_at: now,
        };

        debug!("Creating task: {} (order: {})", task.id, task.order);
        self.insert(&task).await?;
        Ok(task)
    }

    /// Merge `input` over the stored record and persist it.
    pub async fn update(&self, task_id: &str, input: &TaskUpdateInput) -> StorageResult<Task> {
        validate_task_update(input)?;

        let mut task = self
            .get(task_id)
            .await?
            .ok_or_else(|| StorageError::task_not_found(task_id))?;

        debug!("Updating task: {}", task_id);
        task.apply(input);
        task.updated_at = Utc::now().max(task.updated_at);

        self.upsert(&task).await?;
        Ok(task)
    }

    pub async fn insert(&self, task: &Task) -> StorageResult<()> {
        self.write(task, "INSERT INTO").await
    }

    pub async fn upsert(&self, task: &Task) -> StorageResult<()> {
        self.write(task, "INSERT OR REPLACE INTO").await
    }

    async fn write(&self, task: &Task, verb: &str) -> StorageResult<()> {
        let tag_ids = serde_json::to_string(&task.tag_ids)?;
        let recurrence_rule = task
            .recurrence_rule
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let query = format!(
            r#"
            {} tasks (
                id, owner_id, title, description, status, priority,
                due_date, completed_at, reminder_date,
                parent_task_id, tag_ids, project_id, sort_order,
                recurrence_rule, next_occurrence,
                created_at, updated_at
            ) VALUES (
                ?, ?, ?, ?, ?, ?,
                ?, ?, ?,
                ?, ?, ?, ?,
                ?, ?,
                ?, ?
            )
            "#,
            verb
        );

        sqlx::query(&query)
            .bind(&task.id)
            .bind(&task.owner_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.priority.as_str())
            .bind(task.due_date)
            .bind(task.completed_at)
            .bind(task.reminder_date)
            .bind(&task.parent_task_id)
            .bind(tag_ids)
            .bind(&task.project_id)
            .bind(task.order)
            .bind(recurrence_rule)
            .bind(task.next_occurrence)
            .bind(task.created_at)
            .bind(task.updated_at)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// Delete a task and every transitive subtask, deepest first.
    ///
    /// Returns the ids that were actually removed.
    pub async fn delete(&self, task_id: &str) -> StorageResult<Vec<String>> {
        debug!("Deleting task (cascading): {}", task_id);

        // Pre-order walk; reversing it yields children before their parents.
        let mut visit_order = Vec::new();
        let mut stack = vec![task_id.to_string()];
        while let Some(current) = stack.pop() {
            if visit_order.contains(&current) {
                continue;
            }
            for child in self.list_subtasks(&current).await? {
                stack.push(child.id);
            }
            visit_order.push(current);
        }

        let mut deleted = Vec::with_capacity(visit_order.len());
        for id in visit_order.into_iter().rev() {
            let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
                .bind(&id)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;
            if result.rows_affected() > 0 {
                deleted.push(id);
            }
        }

        Ok(deleted)
    }

    /// Set `order` to the position in `task_ids` for exactly the listed tasks.
    ///
    /// The writes are independent and issued concurrently; unlisted tasks keep
    /// their previous order.
    pub async fn reorder(&self, task_ids: &[String]) -> StorageResult<()> {
        debug!("Reordering {} tasks", task_ids.len());

        let updates = task_ids.iter().enumerate().map(|(index, id)| {
            sqlx::query("UPDATE tasks SET sort_order = ? WHERE id = ?")
                .bind(index as i64)
                .bind(id)
                .execute(&self.pool)
        });

        futures::future::try_join_all(updates)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(())
    }
}

fn row_to_task(row: &SqliteRow) -> StorageResult<Task> {
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    let tag_ids: String = row.try_get("tag_ids")?;
    let recurrence_rule: Option<String> = row.try_get("recurrence_rule")?;

    let recurrence_rule = recurrence_rule
        .map(|json| serde_json::from_str::<RecurrenceRule>(&json))
        .transpose()?;

    Ok(Task {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: status.parse().map_err(StorageError::Database)?,
        priority: priority.parse().map_err(StorageError::Database)?,
        due_date: row.try_get("due_date")?,
        completed_at: row.try_get("completed_at")?,
        reminder_date: row.try_get("reminder_date")?,
        parent_task_id: row.try_get("parent_task_id")?,
        tag_ids: serde_json::from_str(&tag_ids)?,
        project_id: row.try_get("project_id")?,
        order: row.try_get("sort_order")?,
        recurrence_rule,
        next_occurrence: row.try_get("next_occurrence")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
