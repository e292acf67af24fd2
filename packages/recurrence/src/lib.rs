// ABOUTME: Recurrence engine for Tasklane
// ABOUTME: Pure occurrence computation plus RRULE text conversion, no I/O

pub mod engine;
pub mod rrule;

use thiserror::Error;

pub use engine::{next_occurrence, occurrences_in_range, Occurrences};
pub use rrule::{parse_rrule, to_rrule};

/// RRULE parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Recurrence rule is empty")]
    Empty,
    #[error("Recurrence rule has no FREQ part")]
    MissingFrequency,
    #[error("Unsupported recurrence frequency: {0}")]
    UnknownFrequency(String),
    #[error("Malformed recurrence rule part: {0}")]
    MalformedPart(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
