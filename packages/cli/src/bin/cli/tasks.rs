// ABOUTME: CLI commands for creating, listing, editing and completing tasks
// ABOUTME: Thin layer translating arguments into task manager calls

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::*;
use inquire::Confirm;
use tasklane_cli::input::{parse_reminder, parse_repeat, parse_when};
use tasklane_cli::App;
use tasklane_core::{TaskCreateInput, TaskPriority, TaskStatus, TaskUpdateInput};
use tasklane_tasks::TaskFilter;

use super::display::{print_task_details, print_task_table, short_id};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        /// Due date: today, tomorrow, YYYY-MM-DD or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long)]
        due: Option<String>,
        /// Reminder: lead time before the due date (30m, 2h, 1d) or a date
        #[arg(long)]
        remind: Option<String>,
        /// daily, weekly, weekdays, monthly, yearly or an RRULE
        #[arg(long)]
        repeat: Option<String>,
        /// Tag name (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Parent task ID, making this a subtask
        #[arg(long)]
        parent: Option<String>,
    },
    /// List tasks
    List {
        #[arg(short, long)]
        status: Option<TaskStatus>,
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        /// Only tasks carrying any of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Search titles and descriptions
        #[arg(long)]
        search: Option<String>,
        /// Include completed and cancelled tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Show task details
    Show {
        /// Task ID or unique prefix
        id: String,
    },
    /// Edit a task
    Update {
        /// Task ID or unique prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        #[arg(short, long)]
        status: Option<TaskStatus>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long, conflicts_with = "clear_remind")]
        remind: Option<String>,
        #[arg(long)]
        clear_remind: bool,
        #[arg(long, conflicts_with = "no_repeat")]
        repeat: Option<String>,
        /// Stop the task from repeating
        #[arg(long)]
        no_repeat: bool,
        /// Replace the task's tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Mark a task completed, creating the next instance if it repeats
    Complete {
        id: String,
    },
    /// Move a completed task back to pending
    Reopen {
        id: String,
    },
    /// Delete a task and all of its subtasks
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a task to a position in the manual order (1 = top)
    Move {
        id: String,
        position: usize,
    },
}

pub async fn handle_task_command(app: &mut App, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add {
            title,
            description,
            priority,
            due,
            remind,
            repeat,
            tags,
            parent,
        } => {
            let now = Utc::now();
            let due_date = due.as_deref().map(|d| parse_when(d, now)).transpose()?;
            let reminder_date = remind
                .as_deref()
                .map(|r| parse_reminder(r, due_date, now))
                .transpose()?;
            let recurrence_rule = repeat.as_deref().map(parse_repeat).transpose()?;
            let parent_task_id = match parent {
                Some(parent) => Some(app.find_task(&parent)?.id),
                None => None,
            };

            let input = TaskCreateInput {
                description,
                priority,
                due_date,
                reminder_date,
                parent_task_id,
                tag_ids: app.tag_ids(&tags)?,
                recurrence_rule,
                ..TaskCreateInput::new(title)
            };

            let owner = app.owner();
            let task = app.tasks.create(input, owner.as_deref()).await?;
            println!("{}", format!("Task '{}' created", task.title).green());
            println!("ID: {}", task.id.cyan());
            if let Some(next) = task.next_occurrence {
                println!("Next occurrence: {}", next.format("%a %b %-d %Y %H:%M"));
            }
            Ok(())
        }
        TaskCommands::List {
            status,
            priority,
            tags,
            search,
            all,
        } => {
            let tag_ids = if tags.is_empty() {
                None
            } else {
                Some(app.tag_ids(&tags)?)
            };
            app.tasks.set_filter(TaskFilter {
                status,
                priority,
                tag_ids,
                search_query: search,
                ..Default::default()
            });

            let show_terminal = all || status.is_some();
            let tasks: Vec<_> = app
                .tasks
                .filtered()
                .into_iter()
                .filter(|t| show_terminal || t.is_active())
                .collect();

            if tasks.is_empty() {
                println!("{}", "No tasks found".yellow());
                println!("{}", "Use 'tasklane task add' to create one".dimmed());
                return Ok(());
            }

            print_task_table(&tasks, app.tags.tags());
            Ok(())
        }
        TaskCommands::Show { id } => {
            let task = app.find_task(&id)?;
            print_task_details(&task, app.tags.tags());

            let subtasks = app.tasks.subtasks(&task.id);
            if !subtasks.is_empty() {
                println!();
                println!("{}", "Subtasks".blue().bold());
                for sub in subtasks {
                    println!("  {} {} ({})", short_id(&sub.id).dimmed(), sub.title, sub.status);
                }
            }
            Ok(())
        }
        TaskCommands::Update {
            id,
            title,
            description,
            clear_description,
            priority,
            status,
            due,
            clear_due,
            remind,
            clear_remind,
            repeat,
            no_repeat,
            tags,
            clear_tags,
        } => {
            let task = app.find_task(&id)?;
            let now = Utc::now();

            let due_date = if clear_due {
                Some(None)
            } else {
                due.as_deref()
                    .map(|d| parse_when(d, now).map(Some))
                    .transpose()?
            };
            let effective_due = due_date.unwrap_or(task.due_date);

            let reminder_date = if clear_remind {
                Some(None)
            } else {
                remind
                    .as_deref()
                    .map(|r| parse_reminder(r, effective_due, now).map(Some))
                    .transpose()?
            };

            let recurrence_rule = if no_repeat {
                Some(None)
            } else {
                repeat
                    .as_deref()
                    .map(|r| parse_repeat(r).map(Some))
                    .transpose()?
            };

            let tag_ids = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(app.tag_ids(&tags)?)
            };

            let input = TaskUpdateInput {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                status,
                priority,
                due_date,
                reminder_date,
                tag_ids,
                recurrence_rule,
                ..Default::default()
            };

            if input.is_empty() {
                println!("{}", "Nothing to update".yellow());
                return Ok(());
            }

            let updated = app.tasks.update(&task.id, input).await?;
            println!("{}", format!("Task '{}' updated", updated.title).green());
            Ok(())
        }
        TaskCommands::Complete { id } => {
            let task = app.find_task(&id)?;
            if task.status == TaskStatus::Completed {
                println!("{}", format!("Task '{}' is already completed", task.title).yellow());
                return Ok(());
            }

            let successor = app.tasks.complete(&task.id).await?;
            println!("{}", format!("Task '{}' completed", task.title).green());
            if let Some(next) = successor {
                println!(
                    "Next instance {} due {}",
                    short_id(&next.id).cyan(),
                    next.due_date
                        .map(|d| d.format("%a %b %-d %Y %H:%M").to_string())
                        .unwrap_or_default()
                );
            }
            Ok(())
        }
        TaskCommands::Reopen { id } => {
            let task = app.find_task(&id)?;
            app.tasks.uncomplete(&task.id).await?;
            println!("{}", format!("Task '{}' reopened", task.title).green());
            Ok(())
        }
        TaskCommands::Delete { id, yes } => {
            let task = app.find_task(&id)?;
            let subtasks = app.tasks.subtasks(&task.id).len();

            let prompt = if subtasks > 0 {
                format!(
                    "Delete '{}' and its subtasks ({} direct)?",
                    task.title, subtasks
                )
            } else {
                format!("Delete '{}'?", task.title)
            };
            let confirmed = yes || Confirm::new(&prompt).with_default(false).prompt()?;

            if !confirmed {
                println!("{}", "Operation cancelled".yellow());
                return Ok(());
            }

            let deleted = app.tasks.delete(&task.id).await?;
            println!("{}", format!("Deleted {} task(s)", deleted.len()).green());
            Ok(())
        }
        TaskCommands::Move { id, position } => {
            let task = app.find_task(&id)?;
            app.tasks.move_task(&task.id, position.saturating_sub(1)).await?;
            println!("{}", format!("Moved '{}' to position {}", task.title, position.max(1)).green());
            Ok(())
        }
    }
}
