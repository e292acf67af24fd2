// ABOUTME: Reminder scheduling for Tasklane
// ABOUTME: Fire-once timers per task backed by a pluggable notification capability

pub mod notifier;
pub mod scheduler;

pub use notifier::{
    Notification, Notifier, NoopNotifier, NotifyError, Permission, RecordingNotifier,
    TracingNotifier, DEFAULT_BODY,
};
pub use scheduler::ReminderScheduler;
