// ABOUTME: Task and tag lifecycle management for Tasklane
// ABOUTME: Cached controllers layering filtering, ordering, recurrence and reminders over storage

pub mod error;
pub mod filter;
pub mod manager;
pub mod tags;

pub use error::{ManagerError, ManagerResult};
pub use filter::TaskFilter;
pub use manager::{sort_tasks, TaskManager};
pub use tags::TagManager;
