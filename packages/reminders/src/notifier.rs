// ABOUTME: Notification capability used by the reminder scheduler
// ABOUTME: Notifier trait plus tracing, no-op and recording implementations

use std::sync::Mutex;

use async_trait::async_trait;
use tasklane_core::Task;
use thiserror::Error;
use tracing::{info, warn};

/// Fallback body for tasks without a description
pub const DEFAULT_BODY: &str = "Task reminder";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notifications are not supported")]
    Unsupported,
    #[error("Notification permission denied")]
    PermissionDenied,
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; asking may still grant it
    Default,
}

/// What the user sees when a reminder fires. `tag` is the task id, so a newer
/// notification for the same task replaces an older one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
}

impl Notification {
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            body: task
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_BODY.to_string()),
            tag: task.id.clone(),
        }
    }
}

/// External delivery mechanism for reminders
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether this environment can show notifications at all
    fn is_supported(&self) -> bool;

    async fn permission(&self) -> Permission;

    async fn request_permission(&self) -> Permission;

    async fn show(&self, notification: Notification) -> Result<(), NotifyError>;

    /// Current permission, asking once if it is still undecided
    async fn ensure_permission(&self) -> Permission {
        if !self.is_supported() {
            return Permission::Denied;
        }
        match self.permission().await {
            Permission::Default => self.request_permission().await,
            decided => decided,
        }
    }
}

/// Delivers reminders as structured log records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    async fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn show(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            task_id = %notification.tag,
            body = %notification.body,
            "Reminder: {}",
            notification.title
        );
        Ok(())
    }
}

/// Stand-in for environments without any notification support
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn is_supported(&self) -> bool {
        false
    }

    async fn permission(&self) -> Permission {
        Permission::Denied
    }

    async fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    async fn show(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }
}

/// Keeps every delivered notification in memory. Useful for embedding and tests.
#[derive(Debug)]
pub struct RecordingNotifier {
    supported: bool,
    permission: Mutex<Permission>,
    answer: Permission,
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Supported, with permission already granted
    pub fn granted() -> Self {
        Self::with_permission(Permission::Granted, Permission::Granted)
    }

    /// Supported, starting at `permission`; a request resolves to `answer`
    pub fn with_permission(permission: Permission, answer: Permission) -> Self {
        Self {
            supported: true,
            permission: Mutex::new(permission),
            answer,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::with_permission(Permission::Denied, Permission::Denied)
        }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(|poisoned| {
                warn!("Recording notifier mutex poisoned, recovering");
                poisoned.into_inner()
            })
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn permission(&self) -> Permission {
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn request_permission(&self) -> Permission {
        let mut permission = self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *permission = self.answer;
        self.answer
    }

    async fn show(&self, notification: Notification) -> Result<(), NotifyError> {
        if !self.supported {
            return Err(NotifyError::Unsupported);
        }
        self.shown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
        Ok(())
    }
}
