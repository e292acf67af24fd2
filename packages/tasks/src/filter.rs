// ABOUTME: In-memory task filters applied by the task manager
// ABOUTME: Independent conjunctive predicates over status, priority, tags, project, text and due range

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasklane_core::{Task, TaskPriority, TaskStatus};

/// Every set field must match; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Any-match: a task passes if it carries at least one of these tags
    pub tag_ids: Option<Vec<String>>,
    pub project_id: Option<String>,
    /// Case-insensitive substring of the title or description
    pub search_query: Option<String>,
    /// Inclusive on both ends; tasks without a due date never match
    pub due_date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        *self == TaskFilter::default()
    }

    /// Overlay the fields set in `other`, keeping the rest.
    pub fn merge(&mut self, other: TaskFilter) {
        if other.status.is_some() {
            self.status = other.status;
        }
        if other.priority.is_some() {
            self.priority = other.priority;
        }
        if other.tag_ids.is_some() {
            self.tag_ids = other.tag_ids;
        }
        if other.project_id.is_some() {
            self.project_id = other.project_id;
        }
        if other.search_query.is_some() {
            self.search_query = other.search_query;
        }
        if other.due_date_range.is_some() {
            self.due_date_range = other.due_date_range;
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }

        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }

        if let Some(tag_ids) = self.tag_ids.as_ref().filter(|ids| !ids.is_empty()) {
            if !tag_ids.iter().any(|tag| task.has_tag(tag)) {
                return false;
            }
        }

        if let Some(project_id) = self.project_id.as_deref().filter(|p| !p.is_empty()) {
            if task.project_id.as_deref() != Some(project_id) {
                return false;
            }
        }

        if let Some(query) = self.search_query.as_deref().filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&query);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query));
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some((start, end)) = self.due_date_range {
            match task.due_date {
                Some(due) if due >= start && due <= end => {}
                _ => return false,
            }
        }

        true
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str) -> Task {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            owner_id: None,
            title: format!("Task {}", id),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: None,
            completed_at: None,
            reminder_date: None,
            parent_task_id: None,
            tag_ids: Vec::new(),
            project_id: None,
            order: 0,
            recurrence_rule: None,
            next_occurrence: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&task("a")));
    }

    #[test]
    fn test_status_and_tags_are_a_conjunction() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Pending),
            tag_ids: Some(vec!["x".to_string()]),
            ..Default::default()
        };

        let both = Task {
            tag_ids: vec!["x".to_string()],
            ..task("both")
        };
        let wrong_status = Task {
            status: TaskStatus::Completed,
            ..both.clone()
        };
        let no_tag = task("plain");

        assert!(filter.matches(&both));
        assert!(!filter.matches(&wrong_status));
        assert!(!filter.matches(&no_tag));
    }

    #[test]
    fn test_search_covers_title_and_description() {
        let filter = TaskFilter {
            search_query: Some("MILK".to_string()),
            ..Default::default()
        };

        let by_title = Task {
            title: "Buy milk".to_string(),
            ..task("t")
        };
        let by_description = Task {
            description: Some("oat milk, two cartons".to_string()),
            ..task("d")
        };

        assert!(filter.matches(&by_title));
        assert!(filter.matches(&by_description));
        assert!(!filter.matches(&task("n")));
    }

    #[test]
    fn test_due_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let filter = TaskFilter {
            due_date_range: Some((start, end)),
            ..Default::default()
        };

        let on_end = Task {
            due_date: Some(end),
            ..task("end")
        };
        let after = Task {
            due_date: Some(end + chrono::Duration::seconds(1)),
            ..task("after")
        };

        assert!(filter.matches(&on_end));
        assert!(!filter.matches(&after));
        assert!(!filter.matches(&task("undated")));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut filter = TaskFilter {
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };
        filter.merge(TaskFilter {
            priority: Some(TaskPriority::High),
            ..Default::default()
        });

        assert_eq!(filter.status, Some(TaskStatus::Pending));
        assert_eq!(filter.priority, Some(TaskPriority::High));
    }
}
