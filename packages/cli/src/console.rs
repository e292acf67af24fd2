// ABOUTME: Terminal notifier used while `tasklane watch` is running
// ABOUTME: Prints reminders to stdout with a timestamp

use async_trait::async_trait;
use chrono::Local;
use colored::*;
use tasklane_reminders::{Notification, Notifier, NotifyError, Permission};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

pub fn render(notification: &Notification, at: &str) -> String {
    format!(
        "{} {} {}\n    {}",
        format!("[{}]", at).dimmed(),
        "Reminder:".yellow().bold(),
        notification.title.bold(),
        notification.body
    )
}

#[async_trait]
impl Notifier for ConsoleNotifier {
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
        let at = Local::now().format("%H:%M").to_string();
        println!("{}", render(&notification, &at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_title_and_body() {
        colored::control::set_override(false);
        let notification = Notification {
            title: "Call dentist".to_string(),
            body: "Ask about Friday".to_string(),
            tag: "t1".to_string(),
        };

        assert_eq!(
            render(&notification, "09:30"),
            "[09:30] Reminder: Call dentist\n    Ask about Friday"
        );
    }
}
