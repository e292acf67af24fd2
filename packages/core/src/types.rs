// ABOUTME: Core domain types shared by every Tasklane package
// ABOUTME: Tasks, tags, recurrence rules, audit events and their create/update inputs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled instances are terminal; everything else is active.
    pub fn is_active(&self) -> bool {
        !matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Ordered from most to least urgent.
    pub const ALL: [TaskPriority; 3] = [TaskPriority::High, TaskPriority::Medium, TaskPriority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(format!("unknown task priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
            RecurrenceType::Yearly => "yearly",
            RecurrenceType::Custom => "custom",
        }
    }
}

impl FromStr for RecurrenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "monthly" => Ok(RecurrenceType::Monthly),
            "yearly" => Ok(RecurrenceType::Yearly),
            "custom" => Ok(RecurrenceType::Custom),
            other => Err(format!("unknown recurrence type: {}", other)),
        }
    }
}

/// How a task repeats. Embedded in [`Task`] and stored as JSON.
///
/// `days_of_week` uses 0 = Sunday through 6 = Saturday and only applies to
/// weekly rules; `day_of_month` only applies to monthly rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceType,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

impl RecurrenceRule {
    pub fn new(kind: RecurrenceType, interval: u32) -> Self {
        Self {
            kind,
            interval,
            end_date: None,
            count: None,
            days_of_week: None,
            day_of_month: None,
        }
    }

    pub fn daily() -> Self {
        Self::new(RecurrenceType::Daily, 1)
    }

    pub fn weekly_on(days: &[u8]) -> Self {
        Self {
            days_of_week: Some(days.to_vec()),
            ..Self::new(RecurrenceType::Weekly, 1)
        }
    }

    pub fn monthly_on(day: u32) -> Self {
        Self {
            day_of_month: Some(day),
            ..Self::new(RecurrenceType::Monthly, 1)
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn times(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Human-readable summary, e.g. "every 2 weeks on Monday, Wednesday".
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.kind {
            RecurrenceType::Daily => "day",
            RecurrenceType::Weekly => "week",
            RecurrenceType::Monthly => "month",
            RecurrenceType::Yearly => "year",
            RecurrenceType::Custom => return f.write_str("Custom recurrence"),
        };

        if self.interval > 1 {
            write!(f, "every {} {}s", self.interval, unit)?;
        } else {
            f.write_str(unit)?;
        }

        match self.kind {
            RecurrenceType::Weekly => {
                let days: Vec<&str> = self
                    .days_of_week
                    .iter()
                    .flatten()
                    .filter_map(|d| WEEKDAY_NAMES.get(*d as usize).copied())
                    .collect();
                if !days.is_empty() {
                    write!(f, " on {}", days.join(", "))?;
                }
            }
            RecurrenceType::Monthly => {
                if let Some(day) = self.day_of_month {
                    write!(f, " on day {}", day)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub owner_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,

    // Scheduling
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,

    // Hierarchy and classification
    pub parent_task_id: Option<String>,
    pub tag_ids: Vec<String>,
    pub project_id: Option<String>,
    pub order: i64,

    // Recurrence
    pub recurrence_rule: Option<RecurrenceRule>,
    pub next_occurrence: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == tag_id)
    }

    /// Merge a partial update over this record. Timestamps are left to the caller.
    pub fn apply(&mut self, update: &TaskUpdateInput) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(reminder_date) = update.reminder_date {
            self.reminder_date = reminder_date;
        }
        if let Some(tag_ids) = &update.tag_ids {
            self.tag_ids = dedup_ids(tag_ids);
        }
        if let Some(project_id) = &update.project_id {
            self.project_id = project_id.clone();
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        if let Some(rule) = &update.recurrence_rule {
            self.recurrence_rule = rule.clone();
        }
        if let Some(next) = update.next_occurrence {
            self.next_occurrence = next;
        }
    }
}

/// Remove duplicate ids while keeping first-seen order.
pub fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateInput {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub parent_task_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub project_id: Option<String>,
    pub order: Option<i64>,
    pub recurrence_rule: Option<RecurrenceRule>,
    pub next_occurrence: Option<DateTime<Utc>>,
}

impl TaskCreateInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial task update.
///
/// Outer `None` leaves a field untouched. For clearable fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdateInput {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub reminder_date: Option<Option<DateTime<Utc>>>,
    pub tag_ids: Option<Vec<String>>,
    pub project_id: Option<Option<String>>,
    pub order: Option<i64>,
    pub recurrence_rule: Option<Option<RecurrenceRule>>,
    pub next_occurrence: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdateInput {
    pub fn is_empty(&self) -> bool {
        *self == TaskUpdateInput::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagCreateInput {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagUpdateInput {
    pub name: Option<String>,
    pub color: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TaskCreated,
    TaskCompleted,
    BadgeEarned,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TaskCreated => "task_created",
            EventType::TaskCompleted => "task_completed",
            EventType::BadgeEarned => "badge_earned",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_created" => Ok(EventType::TaskCreated),
            "task_completed" => Ok(EventType::TaskCompleted),
            "badge_earned" => Ok(EventType::BadgeEarned),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub entity_id: String,
    pub entity_type: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventCreateInput {
    pub kind: EventType,
    pub entity_id: String,
    pub metadata: Option<serde_json::Value>,
}

/// Lightweight snapshot of a recently created or edited task, used to bias suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTaskMeta {
    pub priority: TaskPriority,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_hour: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl RecentTaskMeta {
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            priority: task.priority,
            tag_ids: task.tag_ids.clone(),
            due_hour: task.due_date.map(|d| d.hour()),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_task() -> Task {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        Task {
            id: "t1".to_string(),
            owner_id: None,
            title: "Write report".to_string(),
            description: Some("quarterly".to_string()),
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: Some(now),
            completed_at: None,
            reminder_date: None,
            parent_task_id: None,
            tag_ids: vec!["a".to_string()],
            project_id: None,
            order: 0,
            recurrence_rule: None,
            next_occurrence: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_apply_clears_and_sets_fields() {
        let mut task = sample_task();
        let update = TaskUpdateInput {
            title: Some("Ship report".to_string()),
            description: Some(None),
            due_date: Some(None),
            tag_ids: Some(vec!["b".to_string(), "b".to_string(), "c".to_string()]),
            ..Default::default()
        };

        task.apply(&update);

        assert_eq!(task.title, "Ship report");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.tag_ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_recurrence_rule_json_shape() {
        let rule = RecurrenceRule::weekly_on(&[1, 3]).with_interval(2);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "weekly");
        assert_eq!(json["interval"], 2);
        assert_eq!(json["daysOfWeek"], serde_json::json!([1, 3]));
        assert!(json.get("dayOfMonth").is_none());

        let back: RecurrenceRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_recurrence_rule_description() {
        assert_eq!(RecurrenceRule::daily().to_string(), "day");
        assert_eq!(RecurrenceRule::daily().with_interval(3).to_string(), "every 3 days");
        assert_eq!(
            RecurrenceRule::weekly_on(&[1, 3]).with_interval(2).to_string(),
            "every 2 weeks on Monday, Wednesday"
        );
        assert_eq!(RecurrenceRule::monthly_on(15).to_string(), "month on day 15");
        assert_eq!(
            RecurrenceRule::new(RecurrenceType::Custom, 4).to_string(),
            "Custom recurrence"
        );
    }

    #[test]
    fn test_recent_meta_captures_due_hour() {
        let task = sample_task();
        let meta = RecentTaskMeta::from_task(&task, task.created_at);
        assert_eq!(meta.due_hour, Some(9));
        assert_eq!(meta.priority, TaskPriority::Medium);
    }
}
