// ABOUTME: Quick-capture suggestion groups built from the scheduling candidates
// ABOUTME: Labels due-date and priority candidates for display next to a new-task input

use chrono::{DateTime, Utc};
use serde::Serialize;
use tasklane_core::TaskPriority;

use crate::scheduling::{
    relative_day_label, suggest_due_dates, suggest_priorities, SuggestionContext,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SuggestionValue {
    /// `None` is the explicit "no due date" choice
    DueDate(Option<DateTime<Utc>>),
    Priority(TaskPriority),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSuggestion {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub value: SuggestionValue,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickSuggestionGroup {
    pub id: &'static str,
    pub title: &'static str,
    pub suggestions: Vec<QuickSuggestion>,
}

fn priority_label(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "High priority",
        TaskPriority::Medium => "Standard priority",
        TaskPriority::Low => "Low priority",
    }
}

/// Two groups: suggested due times (ending with "No due date") and priority shortcuts.
pub fn quick_capture_groups(ctx: &SuggestionContext<'_>) -> Vec<QuickSuggestionGroup> {
    let mut due_dates: Vec<QuickSuggestion> = suggest_due_dates(ctx)
        .into_iter()
        .map(|candidate| QuickSuggestion {
            id: format!("due-{}", candidate.id),
            label: relative_day_label(candidate.date, ctx.now),
            description: Some(candidate.description),
            value: SuggestionValue::DueDate(Some(candidate.date)),
            is_recommended: candidate.is_recommended,
        })
        .collect();

    due_dates.push(QuickSuggestion {
        id: "due-none".to_string(),
        label: "No due date".to_string(),
        description: None,
        value: SuggestionValue::DueDate(None),
        is_recommended: false,
    });

    let priorities = suggest_priorities(ctx)
        .into_iter()
        .map(|candidate| QuickSuggestion {
            id: format!("priority-{}", candidate.id),
            label: priority_label(candidate.priority).to_string(),
            description: Some(candidate.description),
            value: SuggestionValue::Priority(candidate.priority),
            is_recommended: candidate.is_recommended,
        })
        .collect();

    vec![
        QuickSuggestionGroup {
            id: "due-dates",
            title: "Suggested due times",
            suggestions: due_dates,
        },
        QuickSuggestionGroup {
            id: "priority",
            title: "Priority shortcuts",
            suggestions: priorities,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_groups_with_empty_history() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let ctx = SuggestionContext::new(&[], &[], now);
        let groups = quick_capture_groups(&ctx);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "due-dates");
        assert_eq!(groups[1].title, "Priority shortcuts");

        let due: Vec<(&str, &str)> = groups[0]
            .suggestions
            .iter()
            .map(|s| (s.id.as_str(), s.label.as_str()))
            .collect();
        assert_eq!(
            due,
            vec![
                ("due-today", "Later today"),
                ("due-tomorrow", "Tomorrow"),
                ("due-none", "No due date"),
            ]
        );

        let none = &groups[0].suggestions[2];
        assert_eq!(none.value, SuggestionValue::DueDate(None));
        assert!(!none.is_recommended);
        assert_eq!(none.description, None);

        let labels: Vec<&str> = groups[1].suggestions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["High priority", "Standard priority", "Low priority"]);
        assert_eq!(groups[1].suggestions[1].id, "priority-medium");
        assert!(groups[1].suggestions[1].is_recommended);
    }

    #[test]
    fn test_suggestion_serializes_type_and_value() {
        let suggestion = QuickSuggestion {
            id: "priority-high".to_string(),
            label: "High priority".to_string(),
            description: None,
            value: SuggestionValue::Priority(TaskPriority::High),
            is_recommended: true,
        };

        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["type"], "priority");
        assert_eq!(json["value"], "high");
        assert_eq!(json["isRecommended"], true);
        assert!(json.get("description").is_none());
    }
}
