// ABOUTME: Table and detail rendering for tasks and tags
// ABOUTME: Shared by every command that prints task lists

use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use tasklane_core::{Tag, Task, TaskPriority, TaskStatus};

const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

pub fn format_when(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match at {
        Some(at) => at.format("%a %b %-d %Y %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => "pending".normal(),
        TaskStatus::InProgress => "in progress".cyan(),
        TaskStatus::Completed => "completed".green(),
        TaskStatus::Cancelled => "cancelled".dimmed(),
    }
}

fn priority_label(priority: TaskPriority) -> ColoredString {
    match priority {
        TaskPriority::High => "High".red(),
        TaskPriority::Medium => "Medium".yellow(),
        TaskPriority::Low => "Low".green(),
    }
}

pub fn tag_names(task: &Task, tags: &[Tag]) -> String {
    let names: Vec<&str> = task
        .tag_ids
        .iter()
        .map(|id| {
            tags.iter()
                .find(|t| &t.id == id)
                .map_or(id.as_str(), |t| t.name.as_str())
        })
        .collect();
    names.join(", ")
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn print_task_table(tasks: &[&Task], tags: &[Tag]) {
    let mut table = new_table();
    table.set_header(vec!["ID", "Title", "Status", "Priority", "Due", "Tags", "Repeats"]);

    for task in tasks {
        let repeats = task
            .recurrence_rule
            .as_ref()
            .map_or_else(String::new, |rule| rule.to_string());

        table.add_row(vec![
            short_id(&task.id).to_string(),
            truncate(&task.title, 40),
            status_label(task.status).to_string(),
            priority_label(task.priority).to_string(),
            format_when(task.due_date),
            truncate(&tag_names(task, tags), 24),
            repeats,
        ]);
    }

    println!("{}", table);
    println!("Total: {} tasks", tasks.len().to_string().cyan());
}

pub fn print_tag_table(tags: &[Tag], tasks: &[Task]) {
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "Color", "Tasks"]);

    for tag in tags {
        let used = tasks.iter().filter(|t| t.has_tag(&tag.id)).count();
        table.add_row(vec![
            tag.id.clone(),
            tag.name.clone(),
            tag.color.clone().unwrap_or_else(|| "-".to_string()),
            used.to_string(),
        ]);
    }

    println!("{}", table);
}

pub fn print_task_details(task: &Task, tags: &[Tag]) {
    println!("{:<15} {}", "ID:".cyan(), task.id);
    println!("{:<15} {}", "Title:".cyan(), task.title);
    println!("{:<15} {}", "Status:".cyan(), status_label(task.status));
    println!("{:<15} {}", "Priority:".cyan(), priority_label(task.priority));

    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        println!("{:<15} {}", "Description:".cyan(), description);
    }
    if task.due_date.is_some() {
        println!("{:<15} {}", "Due:".cyan(), format_when(task.due_date));
    }
    if task.reminder_date.is_some() {
        println!("{:<15} {}", "Reminder:".cyan(), format_when(task.reminder_date));
    }
    if let Some(rule) = &task.recurrence_rule {
        println!("{:<15} {}", "Repeats:".cyan(), rule);
        println!("{:<15} {}", "Next:".cyan(), format_when(task.next_occurrence));
    }
    if !task.tag_ids.is_empty() {
        println!("{:<15} {}", "Tags:".cyan(), tag_names(task, tags));
    }
    if let Some(parent) = &task.parent_task_id {
        println!("{:<15} {}", "Parent:".cyan(), parent);
    }
    if task.completed_at.is_some() {
        println!("{:<15} {}", "Completed:".cyan(), format_when(task.completed_at));
    }

    println!("{:<15} {}", "Created:".cyan(), format_when(Some(task.created_at)));
    println!("{:<15} {}", "Updated:".cyan(), format_when(Some(task.updated_at)));
}
