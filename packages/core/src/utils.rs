// ABOUTME: Shared utility functions for Tasklane
// ABOUTME: ID generation and UTC day arithmetic

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Generate a unique task ID
pub fn generate_task_id() -> String {
    nanoid::nanoid!()
}

/// Generate a unique tag ID (prefixed so tags are recognisable in task tag sets)
pub fn generate_tag_id() -> String {
    format!("tag-{}", nanoid::nanoid!())
}

/// Generate a unique event ID
pub fn generate_event_id() -> String {
    format!("evt-{}", nanoid::nanoid!())
}

/// Midnight (UTC) of the day containing `at`
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Half-open `[start, end)` bounds of the day containing `at`
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(at);
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_task_id();
        let b = generate_task_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 21);

        assert!(generate_tag_id().starts_with("tag-"));
        assert!(generate_event_id().starts_with("evt-"));
    }

    #[test]
    fn test_day_bounds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 15, 42, 7).unwrap();
        let (start, end) = day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }
}
