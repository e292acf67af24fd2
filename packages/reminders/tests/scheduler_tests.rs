// ABOUTME: Integration tests for the reminder scheduler
// ABOUTME: Uses paused tokio time to verify arming, firing, cancelling and permission handling

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tasklane_core::{Task, TaskPriority, TaskStatus};
use tasklane_reminders::{Permission, RecordingNotifier, ReminderScheduler};

fn task(id: &str, reminder_in: Option<Duration>) -> Task {
    let now = Utc::now();
    Task {
        id: id.to_string(),
        owner_id: None,
        title: format!("Reminder {}", id),
        description: None,
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: None,
        completed_at: None,
        reminder_date: reminder_in.map(|d| now + d),
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

fn scheduler_with(notifier: &Arc<RecordingNotifier>) -> ReminderScheduler {
    ReminderScheduler::new(notifier.clone())
}

#[tokio::test(start_paused = true)]
async fn test_future_reminder_fires_once_then_clears() {
    let notifier = Arc::new(RecordingNotifier::granted());
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("a", Some(Duration::minutes(5)))).await;
    assert!(scheduler.is_pending("a"));
    assert!(notifier.shown().is_empty());

    tokio::time::sleep(StdDuration::from_secs(301)).await;

    let shown = notifier.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].tag, "a");
    assert_eq!(shown[0].body, "Task reminder");
    assert_eq!(scheduler.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_past_reminder_fires_immediately_without_timer() {
    let notifier = Arc::new(RecordingNotifier::granted());
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("late", Some(Duration::minutes(-1)))).await;

    assert_eq!(notifier.shown().len(), 1);
    assert!(!scheduler.is_pending("late"));
    // Cancelling afterwards is a harmless no-op
    scheduler.cancel("late");
    assert_eq!(scheduler.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rescheduling_replaces_previous_timer() {
    let notifier = Arc::new(RecordingNotifier::granted());
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("a", Some(Duration::minutes(1)))).await;
    scheduler.schedule(&task("a", Some(Duration::minutes(10)))).await;
    assert_eq!(scheduler.pending_count(), 1);

    tokio::time::sleep(StdDuration::from_secs(120)).await;
    assert!(notifier.shown().is_empty());
    assert!(scheduler.is_pending("a"));

    tokio::time::sleep(StdDuration::from_secs(600)).await;
    assert_eq!(notifier.shown().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_delivery() {
    let notifier = Arc::new(RecordingNotifier::granted());
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("a", Some(Duration::minutes(1)))).await;
    scheduler.cancel("a");
    scheduler.cancel("a");

    tokio::time::sleep(StdDuration::from_secs(120)).await;
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_terminal_or_undated_tasks_clear_their_timer() {
    let notifier = Arc::new(RecordingNotifier::granted());
    let scheduler = scheduler_with(&notifier);

    let mut t = task("a", Some(Duration::minutes(1)));
    scheduler.schedule(&t).await;
    assert!(scheduler.is_pending("a"));

    t.status = TaskStatus::Completed;
    scheduler.schedule(&t).await;
    assert!(!scheduler.is_pending("a"));

    scheduler.schedule(&task("b", Some(Duration::minutes(1)))).await;
    scheduler.schedule(&task("b", None)).await;
    assert_eq!(scheduler.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_denied_permission_skips_scheduling() {
    let notifier = Arc::new(RecordingNotifier::with_permission(
        Permission::Default,
        Permission::Denied,
    ));
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("a", Some(Duration::minutes(1)))).await;
    scheduler.schedule(&task("b", Some(Duration::minutes(-1)))).await;

    assert_eq!(scheduler.pending_count(), 0);
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_capability_is_a_no_op() {
    let notifier = Arc::new(RecordingNotifier::unsupported());
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("a", Some(Duration::minutes(-1)))).await;
    scheduler
        .reschedule_all(&[task("b", Some(Duration::minutes(1)))])
        .await;
    scheduler.cancel("a");

    assert_eq!(scheduler.pending_count(), 0);
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reschedule_all_starts_from_scratch() {
    let notifier = Arc::new(RecordingNotifier::granted());
    let scheduler = scheduler_with(&notifier);

    scheduler.schedule(&task("stale", Some(Duration::hours(1)))).await;

    scheduler
        .reschedule_all(&[
            task("x", Some(Duration::minutes(5))),
            task("y", None),
            task("z", Some(Duration::minutes(15))),
        ])
        .await;

    assert!(!scheduler.is_pending("stale"));
    assert!(scheduler.is_pending("x"));
    assert!(!scheduler.is_pending("y"));
    assert!(scheduler.is_pending("z"));
}
