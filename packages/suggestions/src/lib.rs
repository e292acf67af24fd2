// ABOUTME: Advisory scheduling suggestions for new tasks
// ABOUTME: Due-date and priority candidates derived from current load and recent habits

pub mod quick;
pub mod scheduling;

pub use quick::{quick_capture_groups, QuickSuggestion, QuickSuggestionGroup, SuggestionValue};
pub use scheduling::{
    suggest_due_dates, suggest_priorities, DueDateCandidate, PriorityCandidate,
    SuggestionContext, DEFAULT_DUE_HOUR,
};
