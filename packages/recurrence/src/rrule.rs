// ABOUTME: RFC 5545 RRULE serialization for recurrence rules
// ABOUTME: Converts rules to FREQ/INTERVAL/COUNT/UNTIL/BYDAY/BYMONTHDAY text and parses them back

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tasklane_core::{RecurrenceRule, RecurrenceType};

use crate::RecurrenceError;

const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const CUSTOM_MARKER: &str = "X-TASKLANE-TYPE";

/// Two-letter weekday codes indexed by 0 = Sunday
const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

/// Serialize a rule as an RRULE value (without the `RRULE:` prefix).
pub fn to_rrule(rule: &RecurrenceRule) -> String {
    let freq = match rule.kind {
        RecurrenceType::Daily | RecurrenceType::Custom => "DAILY",
        RecurrenceType::Weekly => "WEEKLY",
        RecurrenceType::Monthly => "MONTHLY",
        RecurrenceType::Yearly => "YEARLY",
    };

    let mut parts = vec![
        format!("FREQ={}", freq),
        format!("INTERVAL={}", rule.interval.max(1)),
    ];

    if let Some(count) = rule.count {
        parts.push(format!("COUNT={}", count));
    }
    if let Some(until) = rule.end_date {
        parts.push(format!("UNTIL={}", until.format(UNTIL_FORMAT)));
    }

    if rule.kind == RecurrenceType::Weekly {
        let days: Vec<&str> = rule
            .days_of_week
            .iter()
            .flatten()
            .filter_map(|d| WEEKDAY_CODES.get(*d as usize).copied())
            .collect();
        if !days.is_empty() {
            parts.push(format!("BYDAY={}", days.join(",")));
        }
    }

    if rule.kind == RecurrenceType::Monthly {
        if let Some(day) = rule.day_of_month {
            parts.push(format!("BYMONTHDAY={}", day));
        }
    }

    if rule.kind == RecurrenceType::Custom {
        parts.push(format!("{}=CUSTOM", CUSTOM_MARKER));
    }

    parts.join(";")
}

/// Parse an RRULE value, with or without the `RRULE:` prefix.
///
/// Unknown parts are ignored. Day selectors are only kept for the frequency
/// they apply to.
pub fn parse_rrule(text: &str) -> Result<RecurrenceRule, RecurrenceError> {
    let text = text.trim();
    let body = match text.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &text[6..],
        _ => text,
    };
    if body.trim().is_empty() {
        return Err(RecurrenceError::Empty);
    }

    let mut kind = None;
    let mut custom = false;
    let mut rule = RecurrenceRule::daily();

    for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| RecurrenceError::MalformedPart(part.to_string()))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "FREQ" => {
                kind = Some(match value.to_ascii_uppercase().as_str() {
                    "DAILY" => RecurrenceType::Daily,
                    "WEEKLY" => RecurrenceType::Weekly,
                    "MONTHLY" => RecurrenceType::Monthly,
                    "YEARLY" => RecurrenceType::Yearly,
                    _ => return Err(RecurrenceError::UnknownFrequency(value.to_string())),
                });
            }
            "INTERVAL" => rule.interval = parse_number(&key, value)?,
            "COUNT" => rule.count = Some(parse_number(&key, value)?),
            "UNTIL" => rule.end_date = Some(parse_until(value)?),
            "BYDAY" => {
                let days = value
                    .split(',')
                    .map(|code| parse_weekday(code.trim()))
                    .collect::<Result<Vec<u8>, _>>()?;
                rule.days_of_week = Some(days);
            }
            "BYMONTHDAY" => {
                // Only the first listed day is representable
                let first = value.split(',').next().unwrap_or_default();
                rule.day_of_month = Some(parse_number(&key, first)?);
            }
            CUSTOM_MARKER => custom = value.eq_ignore_ascii_case("CUSTOM"),
            _ => {}
        }
    }

    let kind = kind.ok_or(RecurrenceError::MissingFrequency)?;
    rule.kind = if custom && kind == RecurrenceType::Daily {
        RecurrenceType::Custom
    } else {
        kind
    };

    if rule.kind != RecurrenceType::Weekly {
        rule.days_of_week = None;
    }
    if rule.kind != RecurrenceType::Monthly {
        rule.day_of_month = None;
    }

    Ok(rule)
}

fn parse_number(key: &str, value: &str) -> Result<u32, RecurrenceError> {
    value.parse().map_err(|_| RecurrenceError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_until(value: &str) -> Result<DateTime<Utc>, RecurrenceError> {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, UNTIL_FORMAT) {
        return Ok(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
        return Ok(parsed.and_utc());
    }
    // A bare date bounds the whole day
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        if let Some(end_of_day) = NaiveTime::from_hms_opt(23, 59, 59) {
            return Ok(date.and_time(end_of_day).and_utc());
        }
    }
    Err(RecurrenceError::InvalidValue {
        key: "UNTIL".to_string(),
        value: value.to_string(),
    })
}

fn parse_weekday(code: &str) -> Result<u8, RecurrenceError> {
    // Ordinal prefixes such as "1MO" or "-1FR" are not supported by the engine,
    // so only the weekday itself is kept.
    let letters = code.trim_start_matches(|c: char| c == '+' || c == '-' || c.is_ascii_digit());
    WEEKDAY_CODES
        .iter()
        .position(|w| w.eq_ignore_ascii_case(letters))
        .map(|i| i as u8)
        .ok_or_else(|| RecurrenceError::InvalidValue {
            key: "BYDAY".to_string(),
            value: code.to_string(),
        })
}
