// ABOUTME: Input validation for tasks, tags and recurrence rules
// ABOUTME: Typed field-level errors checked before anything reaches storage

use thiserror::Error;

use crate::types::{
    RecurrenceRule, RecurrenceType, TagCreateInput, TagUpdateInput, TaskCreateInput,
    TaskUpdateInput,
};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const TAG_NAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} is out of range: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    #[error("{field} only applies to {applies_to} recurrence")]
    NotApplicable {
        field: &'static str,
        applies_to: &'static str,
    },

    #[error("Invalid color: {0}. Expected #RGB or #RRGGBB")]
    InvalidColor(String),
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotApplicable { field, .. } => field,
            ValidationError::InvalidColor(_) => "color",
        }
    }
}

pub fn validate_task_create(input: &TaskCreateInput) -> Result<(), ValidationError> {
    validate_title(&input.title)?;
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    if let Some(rule) = &input.recurrence_rule {
        validate_recurrence_rule(rule)?;
    }
    Ok(())
}

pub fn validate_task_update(input: &TaskUpdateInput) -> Result<(), ValidationError> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(Some(description)) = &input.description {
        validate_description(description)?;
    }
    if let Some(Some(rule)) = &input.recurrence_rule {
        validate_recurrence_rule(rule)?;
    }
    Ok(())
}

pub fn validate_tag_create(input: &TagCreateInput) -> Result<(), ValidationError> {
    validate_tag_name(&input.name)?;
    if let Some(color) = &input.color {
        validate_color(color)?;
    }
    Ok(())
}

pub fn validate_tag_update(input: &TagUpdateInput) -> Result<(), ValidationError> {
    if let Some(name) = &input.name {
        validate_tag_name(name)?;
    }
    if let Some(Some(color)) = &input.color {
        validate_color(color)?;
    }
    Ok(())
}

pub fn validate_recurrence_rule(rule: &RecurrenceRule) -> Result<(), ValidationError> {
    if rule.interval == 0 {
        return Err(ValidationError::OutOfRange {
            field: "interval",
            message: "must be a positive integer".to_string(),
        });
    }

    if rule.count == Some(0) {
        return Err(ValidationError::OutOfRange {
            field: "count",
            message: "must be a positive integer".to_string(),
        });
    }

    if let Some(days) = &rule.days_of_week {
        if rule.kind != RecurrenceType::Weekly && !days.is_empty() {
            return Err(ValidationError::NotApplicable {
                field: "daysOfWeek",
                applies_to: "weekly",
            });
        }
        if let Some(bad) = days.iter().find(|d| **d > 6) {
            return Err(ValidationError::OutOfRange {
                field: "daysOfWeek",
                message: format!("{} is not a weekday index (0-6)", bad),
            });
        }
    }

    if let Some(day) = rule.day_of_month {
        if rule.kind != RecurrenceType::Monthly {
            return Err(ValidationError::NotApplicable {
                field: "dayOfMonth",
                applies_to: "monthly",
            });
        }
        if !(1..=31).contains(&day) {
            return Err(ValidationError::OutOfRange {
                field: "dayOfMonth",
                message: format!("{} is not between 1 and 31", day),
            });
        }
    }

    Ok(())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::Required { field: "title" });
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "title",
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "description",
            max: DESCRIPTION_MAX_CHARS,
        });
    }
    Ok(())
}

fn validate_tag_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    if name.chars().count() > TAG_NAME_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "name",
            max: TAG_NAME_MAX_CHARS,
        });
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = match color.strip_prefix('#') {
        Some(hex) => hex,
        None => return Err(ValidationError::InvalidColor(color.to_string())),
    };
    if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_title_is_required() {
        let input = TaskCreateInput::new("   ");
        let err = validate_task_create(&input).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "title" });
        assert_eq!(err.field(), "title");
    }

    #[test]
    fn test_title_length_limit() {
        let ok = TaskCreateInput::new("x".repeat(TITLE_MAX_CHARS));
        assert!(validate_task_create(&ok).is_ok());

        let too_long = TaskCreateInput::new("x".repeat(TITLE_MAX_CHARS + 1));
        assert!(matches!(
            validate_task_create(&too_long),
            Err(ValidationError::TooLong { field: "title", .. })
        ));
    }

    #[test]
    fn test_description_length_limit() {
        let input = TaskCreateInput {
            description: Some("d".repeat(DESCRIPTION_MAX_CHARS + 1)),
            ..TaskCreateInput::new("ok")
        };
        assert_eq!(validate_task_create(&input).unwrap_err().field(), "description");
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        assert!(validate_task_update(&TaskUpdateInput::default()).is_ok());

        let clear_description = TaskUpdateInput {
            description: Some(None),
            ..Default::default()
        };
        assert!(validate_task_update(&clear_description).is_ok());

        let blank_title = TaskUpdateInput {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_task_update(&blank_title).is_err());
    }

    #[test]
    fn test_recurrence_rule_bounds() {
        assert!(validate_recurrence_rule(&RecurrenceRule::daily()).is_ok());
        assert!(validate_recurrence_rule(&RecurrenceRule::daily().with_interval(0)).is_err());
        assert!(validate_recurrence_rule(&RecurrenceRule::weekly_on(&[0, 6])).is_ok());
        assert!(validate_recurrence_rule(&RecurrenceRule::weekly_on(&[7])).is_err());
        assert!(validate_recurrence_rule(&RecurrenceRule::monthly_on(31)).is_ok());
        assert!(validate_recurrence_rule(&RecurrenceRule::monthly_on(0)).is_err());
        assert!(validate_recurrence_rule(&RecurrenceRule::daily().times(0)).is_err());
    }

    #[test]
    fn test_day_selectors_must_match_type() {
        let mut rule = RecurrenceRule::daily();
        rule.day_of_month = Some(3);
        assert_eq!(
            validate_recurrence_rule(&rule),
            Err(ValidationError::NotApplicable {
                field: "dayOfMonth",
                applies_to: "monthly"
            })
        );
    }

    #[test]
    fn test_tag_rules() {
        let ok = TagCreateInput {
            name: "school".to_string(),
            color: Some("#A8D8EA".to_string()),
        };
        assert!(validate_tag_create(&ok).is_ok());

        let long = TagCreateInput {
            name: "n".repeat(TAG_NAME_MAX_CHARS + 1),
            color: None,
        };
        assert!(validate_tag_create(&long).is_err());

        let bad_color = TagCreateInput {
            name: "ok".to_string(),
            color: Some("blue".to_string()),
        };
        assert_eq!(
            validate_tag_create(&bad_color),
            Err(ValidationError::InvalidColor("blue".to_string()))
        );

        let short_hex = TagUpdateInput {
            name: None,
            color: Some(Some("#fff".to_string())),
        };
        assert!(validate_tag_update(&short_hex).is_ok());
    }
}
