// ABOUTME: Due-date and priority candidate generation
// ABOUTME: Pure functions over the task list and the recency buffer; all day math is UTC

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tasklane_core::{start_of_day, RecentTaskMeta, Task, TaskPriority, TaskStatus};
use tracing::debug;

/// Hour of day used when the recency buffer has no due hours
pub const DEFAULT_DUE_HOUR: u32 = 17;

/// Days after today scanned for the lightest day
const LIGHT_DAY_HORIZON: i64 = 7;

const IN_PROGRESS_BUSY: usize = 3;

/// Everything the suggestion functions look at
#[derive(Debug, Clone, Copy)]
pub struct SuggestionContext<'a> {
    pub tasks: &'a [Task],
    pub recent: &'a [RecentTaskMeta],
    pub now: DateTime<Utc>,
}

impl<'a> SuggestionContext<'a> {
    pub fn new(tasks: &'a [Task], recent: &'a [RecentTaskMeta], now: DateTime<Utc>) -> Self {
        Self { tasks, recent, now }
    }

    fn active_tasks(&self) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter().filter(|t| t.is_active())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateCandidate {
    pub id: &'static str,
    pub date: DateTime<Utc>,
    pub description: String,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCandidate {
    pub id: &'static str,
    pub priority: TaskPriority,
    pub description: String,
    pub is_recommended: bool,
}

/// Most frequent value; on a tie the value that reached the top count first wins.
fn mode<T, I>(values: I) -> Option<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut best: Option<(T, usize)> = None;

    for value in values {
        let count = counts.entry(value).or_insert(0);
        *count += 1;
        if best.map_or(true, |(_, max)| *count > max) {
            best = Some((value, *count));
        }
    }

    best.map(|(value, _)| value)
}

fn preferred_due_hour(recent: &[RecentTaskMeta]) -> u32 {
    mode(recent.iter().filter_map(|m| m.due_hour))
        .filter(|hour| *hour < 24)
        .unwrap_or(DEFAULT_DUE_HOUR)
}

fn load_on<'a>(active: impl Iterator<Item = &'a Task>, day: NaiveDate) -> usize {
    active
        .filter(|t| t.due_date.is_some_and(|due| due.date_naive() == day))
        .count()
}

fn at_hour(day_start: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    day_start + Duration::hours(i64::from(hour))
}

pub(crate) fn clock_label(at: DateTime<Utc>) -> String {
    at.format("%-I:%M %p").to_string()
}

/// "Later today", "Tomorrow" or "Next <Weekday>" relative to `now`
pub(crate) fn relative_day_label(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    let target_day = target.date_naive();

    if target_day == today {
        "Later today".to_string()
    } else if today.succ_opt() == Some(target_day) {
        "Tomorrow".to_string()
    } else {
        format!("Next {}", target.format("%A"))
    }
}

/// Candidate due dates, at most one of them recommended.
///
/// Today is offered only while the preferred hour is still ahead and today is
/// not already overloaded. Tomorrow is always offered. The lightest of the
/// following days is offered when it is not tomorrow itself.
/// The "no due date" choice is not a date and is appended by
/// [`quick_capture_groups`](crate::quick_capture_groups).
pub fn suggest_due_dates(ctx: &SuggestionContext<'_>) -> Vec<DueDateCandidate> {
    let today_start = start_of_day(ctx.now);
    let preferred_hour = preferred_due_hour(ctx.recent);

    let active_count = ctx.active_tasks().count();
    let average_daily_load = (active_count as f64 / 7.0).round() as usize;
    let load_threshold = average_daily_load.max(2);
    let due_today = load_on(ctx.active_tasks(), today_start.date_naive());

    let mut candidates = Vec::with_capacity(3);

    let today_at_preferred = at_hour(today_start, preferred_hour);
    if today_at_preferred > ctx.now && due_today <= load_threshold {
        candidates.push(DueDateCandidate {
            id: "today",
            date: today_at_preferred,
            description: format!("Today · {}", clock_label(today_at_preferred)),
            is_recommended: true,
        });
    }

    let tomorrow = today_start + Duration::days(1);
    let tomorrow_at_preferred = at_hour(tomorrow, preferred_hour);
    candidates.push(DueDateCandidate {
        id: "tomorrow",
        date: tomorrow_at_preferred,
        description: format!("Tomorrow · {}", clock_label(tomorrow_at_preferred)),
        is_recommended: candidates.is_empty(),
    });

    let mut lightest_day = tomorrow_at_preferred;
    let mut lightest_load = load_on(ctx.active_tasks(), tomorrow.date_naive());
    for offset in 2..=LIGHT_DAY_HORIZON {
        let day = today_start + Duration::days(offset);
        let load = load_on(ctx.active_tasks(), day.date_naive());
        if load < lightest_load {
            lightest_load = load;
            lightest_day = at_hour(day, preferred_hour);
        }
        if lightest_load == 0 {
            break;
        }
    }

    if (lightest_day - tomorrow_at_preferred).num_seconds().abs() >= 60 {
        let nothing_recommended = candidates.iter().all(|c| !c.is_recommended);
        candidates.push(DueDateCandidate {
            id: "next-light-day",
            date: lightest_day,
            description: format!(
                "{} · {}",
                relative_day_label(lightest_day, ctx.now),
                clock_label(lightest_day)
            ),
            is_recommended: nothing_recommended,
        });
    }

    debug!(
        "Suggested {} due dates (preferred hour {}, threshold {})",
        candidates.len(),
        preferred_hour,
        load_threshold
    );
    candidates
}

fn generic_description(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "Great for urgent or overdue work",
        TaskPriority::Medium => "Keeps the task in your active queue",
        TaskPriority::Low => "Ideal for flexible or nice-to-have items",
    }
}

/// All three priorities, high first, with exactly one recommended.
pub fn suggest_priorities(ctx: &SuggestionContext<'_>) -> Vec<PriorityCandidate> {
    let overdue = ctx
        .active_tasks()
        .filter(|t| t.due_date.is_some_and(|due| due < ctx.now))
        .count();
    let in_progress = ctx
        .active_tasks()
        .filter(|t| t.status == TaskStatus::InProgress)
        .count();
    let habitual = mode(ctx.recent.iter().map(|m| m.priority));

    let (recommended, description) = if overdue > 0 {
        let description = if overdue == 1 {
            "You have 1 overdue task".to_string()
        } else {
            format!("You have {} overdue tasks", overdue)
        };
        (TaskPriority::High, description)
    } else if in_progress >= IN_PROGRESS_BUSY && habitual != Some(TaskPriority::High) {
        (
            TaskPriority::Medium,
            "You already have several tasks in progress".to_string(),
        )
    } else if let Some(priority) = habitual {
        (priority, "Matches your recent tasks".to_string())
    } else {
        (TaskPriority::Medium, "Start in the active queue".to_string())
    };

    TaskPriority::ALL
        .into_iter()
        .map(|priority| {
            let is_recommended = priority == recommended;
            PriorityCandidate {
                id: priority.as_str(),
                priority,
                description: if is_recommended {
                    description.clone()
                } else {
                    generic_description(priority).to_string()
                },
                is_recommended,
            }
        })
        .collect()
}
