// ABOUTME: In-process reminder timers keyed by task id
// ABOUTME: Arms at most one fire-once timer per task; supports cancel and reschedule-all

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tasklane_core::Task;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::notifier::{Notification, Notifier, Permission};

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

type Timers = Arc<Mutex<HashMap<String, Timer>>>;

/// Best-effort reminder service. Never returns errors to the caller: missing
/// capability or permission simply means nothing gets armed.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    timers: Timers,
    generation: AtomicU64,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            timers: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.notifier.is_supported()
    }

    /// Bring the timer for `task` in line with its reminder date and status.
    pub async fn schedule(&self, task: &Task) {
        if !self.notifier.is_supported() {
            return;
        }

        let reminder = match task.reminder_date {
            Some(reminder) if task.is_active() => reminder,
            _ => {
                self.cancel(&task.id);
                return;
            }
        };

        if self.notifier.ensure_permission().await != Permission::Granted {
            debug!("Notification permission not granted, skipping reminder for {}", task.id);
            self.cancel(&task.id);
            return;
        }

        let notification = Notification::for_task(task);
        let delay = match (reminder - Utc::now()).to_std() {
            Ok(delay) if !delay.is_zero() => delay,
            // Already due: deliver now and keep nothing armed
            _ => {
                self.cancel(&task.id);
                deliver(self.notifier.as_ref(), notification).await;
                return;
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let notifier = Arc::clone(&self.notifier);
        let timers = Arc::clone(&self.timers);
        let task_id = task.id.clone();

        // Replace under one lock so the last caller's timer is the one that stays
        let mut guard = lock(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = lock(&timers);
                if timers.get(&task_id).map(|t| t.generation) == Some(generation) {
                    timers.remove(&task_id);
                }
            }
            deliver(notifier.as_ref(), notification).await;
        });

        if let Some(previous) = guard.insert(task.id.clone(), Timer { generation, handle }) {
            previous.handle.abort();
        }
        debug!("Armed reminder for {} in {:?}", task.id, delay);
    }

    /// Clear any pending timer for `task_id`. Idempotent.
    pub fn cancel(&self, task_id: &str) {
        if let Some(timer) = lock(&self.timers).remove(task_id) {
            timer.handle.abort();
            debug!("Cancelled reminder for {}", task_id);
        }
    }

    pub fn cancel_all(&self) {
        let mut timers = lock(&self.timers);
        for (_, timer) in timers.drain() {
            timer.handle.abort();
        }
    }

    /// Clear every timer, then schedule each task in order.
    pub async fn reschedule_all(&self, tasks: &[Task]) {
        if !self.notifier.is_supported() {
            return;
        }

        self.cancel_all();
        for task in tasks {
            self.schedule(task).await;
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.timers).len()
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        lock(&self.timers).contains_key(task_id)
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn deliver(notifier: &dyn Notifier, notification: Notification) {
    let task_id = notification.tag.clone();
    if let Err(e) = notifier.show(notification).await {
        warn!(task_id = %task_id, "Failed to show reminder: {}", e);
    }
}

fn lock(timers: &Mutex<HashMap<String, Timer>>) -> MutexGuard<'_, HashMap<String, Timer>> {
    timers.lock().unwrap_or_else(|poisoned| {
        warn!("Reminder timer mutex poisoned, recovering");
        poisoned.into_inner()
    })
}
