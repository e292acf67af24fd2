// ABOUTME: RFC 5545 VCALENDAR rendering of tasks
// ABOUTME: One 30-minute VEVENT per due-dated task, with RRULE and VALARM when applicable

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tasklane_core::{Task, TaskPriority, TaskStatus};
use tasklane_recurrence::to_rrule;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

pub const PRODUCT_ID: &str = "-//Tasklane//Tasklane Tasks//EN";

/// Every exported event lasts this long from its due date
pub const EVENT_DURATION_MINUTES: i64 = 30;

const UID_DOMAIN: &str = "tasklane";
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LINE_END: &str = "\r\n";

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Failed to write calendar to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

fn format_stamp(at: DateTime<Utc>) -> String {
    at.format(STAMP_FORMAT).to_string()
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

fn ical_priority(priority: TaskPriority) -> u8 {
    match priority {
        TaskPriority::High => 1,
        TaskPriority::Medium => 5,
        TaskPriority::Low => 9,
    }
}

/// VEVENT lines for one task, or `None` when it has no due date.
fn event_lines(task: &Task, stamp: &str) -> Option<Vec<String>> {
    let due = task.due_date?;
    let end = due + Duration::minutes(EVENT_DURATION_MINUTES);

    let status = if task.status == TaskStatus::Completed {
        "COMPLETED"
    } else {
        "CONFIRMED"
    };

    let mut lines = vec![
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@{}", task.id, UID_DOMAIN),
        format!("DTSTAMP:{}", stamp),
        format!("SUMMARY:{}", escape_text(&task.title)),
        format!(
            "DESCRIPTION:{}",
            escape_text(task.description.as_deref().unwrap_or_default())
        ),
        format!("DTSTART:{}", format_stamp(due)),
        format!("DTEND:{}", format_stamp(end)),
        format!("STATUS:{}", status),
        format!("PRIORITY:{}", ical_priority(task.priority)),
    ];

    if let Some(rule) = &task.recurrence_rule {
        lines.push(format!("RRULE:{}", to_rrule(rule)));
    }

    // Reminders after the due date cannot be expressed as a lead time
    if let Some(reminder) = task.reminder_date.filter(|r| *r <= due) {
        let lead = due - reminder;
        let minutes = (lead.num_milliseconds() as f64 / 60_000.0).round() as i64;
        lines.extend([
            "BEGIN:VALARM".to_string(),
            format!("TRIGGER:-PT{}M", minutes),
            "ACTION:DISPLAY".to_string(),
            format!("DESCRIPTION:Reminder for {}", escape_text(&task.title)),
            "END:VALARM".to_string(),
        ]);
    }

    lines.push("END:VEVENT".to_string());
    Some(lines)
}

/// Render `tasks` as a VCALENDAR document. Tasks without a due date are skipped.
///
/// `stamp` becomes the DTSTAMP of every event.
pub fn generate_calendar(tasks: &[Task], stamp: DateTime<Utc>) -> String {
    let stamp = format_stamp(stamp);

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
    ];

    let mut events = 0;
    for task in tasks {
        if let Some(event) = event_lines(task, &stamp) {
            lines.extend(event);
            events += 1;
        }
    }
    lines.push("END:VCALENDAR".to_string());

    debug!("Rendered {} of {} tasks as calendar events", events, tasks.len());
    lines.join(LINE_END)
}

/// Write the calendar for `tasks` to `path`, returning how many events it holds.
pub async fn write_calendar(path: &Path, tasks: &[Task]) -> Result<usize, CalendarError> {
    let events = tasks.iter().filter(|t| t.due_date.is_some()).count();
    let document = generate_calendar(tasks, Utc::now());

    fs::write(path, document)
        .await
        .map_err(|source| CalendarError::Write {
            path: path.display().to_string(),
            source,
        })?;

    info!("Exported {} events to {}", events, path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_text() {
        assert_eq!(
            escape_text("a,b;c\\d\nnext"),
            "a\\,b\\;c\\\\d\\nnext"
        );
        assert_eq!(escape_text("windows\r\nline"), "windows\\nline");
    }

    #[test]
    fn test_priority_scale() {
        assert_eq!(ical_priority(TaskPriority::High), 1);
        assert_eq!(ical_priority(TaskPriority::Medium), 5);
        assert_eq!(ical_priority(TaskPriority::Low), 9);
    }

    #[test]
    fn test_empty_calendar_is_well_formed() {
        let stamp = DateTime::<Utc>::UNIX_EPOCH;
        assert_eq!(
            generate_calendar(&[], stamp),
            format!(
                "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:{}\r\nCALSCALE:GREGORIAN\r\nEND:VCALENDAR",
                PRODUCT_ID
            )
        );
    }
}
