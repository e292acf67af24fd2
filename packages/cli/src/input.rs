// ABOUTME: Parsing of user-typed dates, reminder offsets and repeat rules
// ABOUTME: Accepts shortcuts like "tomorrow", "30m" and "weekdays" alongside full formats

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tasklane_core::{start_of_day, RecurrenceRule, RecurrenceType};
use tasklane_recurrence::parse_rrule;
use tasklane_suggestions::DEFAULT_DUE_HOUR;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

fn at_default_hour(day_start: DateTime<Utc>) -> DateTime<Utc> {
    day_start + Duration::hours(i64::from(DEFAULT_DUE_HOUR))
}

/// Parse a due date. Bare days ("today", "tomorrow", "2024-05-01") land on
/// the default due hour; times are taken as UTC.
pub fn parse_when(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();

    match input.to_lowercase().as_str() {
        "today" => return Ok(at_default_hour(start_of_day(now))),
        "tomorrow" => return Ok(at_default_hour(start_of_day(now) + Duration::days(1))),
        _ => {}
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Unrecognised date '{}'", input))?;
    Ok(at_default_hour(day.and_time(chrono::NaiveTime::MIN).and_utc()))
}

/// Parse a lead time such as `45m`, `2h` or `1d`.
pub fn parse_lead(input: &str) -> Option<Duration> {
    let input = input.trim();
    let unit = input.chars().last()?;
    let amount: i64 = input[..input.len() - unit.len_utf8()].parse().ok()?;
    if amount < 0 {
        return None;
    }

    match unit.to_ascii_lowercase() {
        'm' => Some(Duration::minutes(amount)),
        'h' => Some(Duration::hours(amount)),
        'd' => Some(Duration::days(amount)),
        _ => None,
    }
}

/// A reminder is either a lead time before `due` or an absolute date.
pub fn parse_reminder(
    input: &str,
    due: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    match parse_lead(input) {
        Some(lead) => {
            let due = due.ok_or_else(|| anyhow!("A relative reminder needs a due date"))?;
            Ok(due - lead)
        }
        None => parse_when(input, now),
    }
}

/// Repeat shortcuts (`daily`, `weekly`, `weekdays`, `monthly`, `yearly`) or an RRULE.
pub fn parse_repeat(input: &str) -> Result<RecurrenceRule> {
    let rule = match input.trim().to_lowercase().as_str() {
        "daily" => RecurrenceRule::daily(),
        "weekly" => RecurrenceRule::new(RecurrenceType::Weekly, 1),
        "weekdays" => RecurrenceRule::weekly_on(&[1, 2, 3, 4, 5]),
        "monthly" => RecurrenceRule::new(RecurrenceType::Monthly, 1),
        "yearly" => RecurrenceRule::new(RecurrenceType::Yearly, 1),
        "" => bail!("Repeat rule is empty"),
        _ => parse_rrule(input).with_context(|| format!("Invalid repeat rule '{}'", input))?,
    };
    Ok(rule)
}
