// ABOUTME: Calendar export for Tasklane
// ABOUTME: Renders due-dated tasks as an iCalendar document and saves it to disk

pub mod ics;

pub use ics::{generate_calendar, write_calendar, CalendarError, EVENT_DURATION_MINUTES, PRODUCT_ID};
