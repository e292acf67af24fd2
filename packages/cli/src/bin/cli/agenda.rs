// ABOUTME: Read-mostly commands: overdue and today views, suggestions, export and watch
// ABOUTME: Watch keeps the process alive so armed reminders can fire

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use colored::*;
use tasklane_calendar::write_calendar;
use tasklane_cli::App;
use tasklane_suggestions::{quick_capture_groups, SuggestionContext};

use super::display::print_task_table;

pub async fn overdue(app: &mut App) -> Result<()> {
    let owner = app.owner();
    let tasks = app.tasks.overdue(owner.as_deref()).await?;

    if tasks.is_empty() {
        println!("{}", "Nothing overdue".green());
        return Ok(());
    }

    println!("{}", "Overdue".red().bold());
    print_task_table(&tasks.iter().collect::<Vec<_>>(), app.tags.tags());
    Ok(())
}

pub async fn today(app: &mut App) -> Result<()> {
    let owner = app.owner();
    let tasks = app.tasks.due_today(owner.as_deref()).await?;

    if tasks.is_empty() {
        println!("{}", "Nothing due today".green());
        return Ok(());
    }

    println!("{}", "Due today".blue().bold());
    print_task_table(&tasks.iter().collect::<Vec<_>>(), app.tags.tags());
    Ok(())
}

pub fn suggest(app: &App) {
    let ctx = SuggestionContext::new(app.tasks.tasks(), app.tasks.recent_meta(), Utc::now());

    for group in quick_capture_groups(&ctx) {
        println!("{}", group.title.blue().bold());
        for suggestion in &group.suggestions {
            let marker = if suggestion.is_recommended {
                "*".green().bold()
            } else {
                " ".normal()
            };
            match &suggestion.description {
                Some(description) => println!(
                    "  {} {:<20} {}",
                    marker,
                    suggestion.label,
                    description.dimmed()
                ),
                None => println!("  {} {}", marker, suggestion.label),
            }
        }
        println!();
    }
    println!("{}", "* recommended".dimmed());
}

pub async fn export(app: &App, path: &Path) -> Result<()> {
    let events = write_calendar(path, app.tasks.tasks()).await?;
    println!(
        "{}",
        format!("Exported {} event(s) to {}", events, path.display()).green()
    );
    Ok(())
}

pub async fn watch(app: &App) -> Result<()> {
    if !app.reminders.is_supported() {
        println!(
            "{}",
            "Notifications are disabled; set TASKLANE_NOTIFICATIONS=enabled to watch reminders"
                .yellow()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Watching {} task(s), {} reminder(s) armed. Press Ctrl-C to stop.",
            app.tasks.tasks().len(),
            app.reminders.pending_count()
        )
        .blue()
    );

    tokio::signal::ctrl_c().await?;
    app.reminders.cancel_all();
    println!("{}", "Stopped watching".dimmed());
    Ok(())
}
