// ABOUTME: Core types, validation and utilities for Tasklane
// ABOUTME: Foundational package providing the data model shared across all Tasklane packages

pub mod constants;
pub mod session;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    dedup_ids, Event, EventCreateInput, EventType, RecentTaskMeta, RecurrenceRule,
    RecurrenceType, Tag, TagCreateInput, TagUpdateInput, Task, TaskCreateInput, TaskPriority,
    TaskStatus, TaskUpdateInput,
};

pub use session::Session;

// Re-export constants
pub use constants::{database_file, recent_meta_file, tasklane_dir, MAX_RECENT_TASK_META};

// Re-export utilities
pub use utils::{day_bounds, generate_event_id, generate_tag_id, generate_task_id, start_of_day};

// Re-export validation
pub use validation::{
    validate_recurrence_rule, validate_tag_create, validate_tag_update, validate_task_create,
    validate_task_update, ValidationError,
};
