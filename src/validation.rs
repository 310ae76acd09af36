use crate::models::{TaskInput, TaskPatch, TaskPriority, TaskStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"));

/// Tagged constraint set for a single task field. Every external write goes
/// through these descriptors before any storage or network call.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    Text {
        required: bool,
        max: usize,
        trim: bool,
        required_message: &'static str,
        too_long_message: &'static str,
    },
    OneOf {
        allowed: &'static [&'static str],
        message: &'static str,
    },
    DatePattern {
        message: &'static str,
    },
    Range {
        min: f64,
        max: f64,
        below_message: &'static str,
        above_message: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    pub field: &'static str,
    pub rule: FieldRule,
}

pub static TASK_SCHEMA: &[FieldSchema] = &[
    FieldSchema {
        field: "title",
        rule: FieldRule::Text {
            required: true,
            max: 200,
            trim: true,
            required_message: "Title is required",
            too_long_message: "Title must be less than 200 characters",
        },
    },
    FieldSchema {
        field: "status",
        rule: FieldRule::OneOf {
            allowed: &TaskStatus::ALLOWED,
            message: "Invalid status",
        },
    },
    FieldSchema {
        field: "priority",
        rule: FieldRule::OneOf {
            allowed: &TaskPriority::ALLOWED,
            message: "Invalid priority",
        },
    },
    FieldSchema {
        field: "assignee",
        rule: FieldRule::Text {
            required: false,
            max: 100,
            trim: false,
            required_message: "",
            too_long_message: "Assignee name must be less than 100 characters",
        },
    },
    FieldSchema {
        field: "dueDate",
        rule: FieldRule::DatePattern {
            message: "Invalid date format (YYYY-MM-DD)",
        },
    },
    FieldSchema {
        field: "progress",
        rule: FieldRule::Range {
            min: 0.0,
            max: 100.0,
            below_message: "Progress must be at least 0",
            above_message: "Progress must be at most 100",
        },
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == name)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(FieldError::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

fn check(field: &'static str, rule: FieldRule, value: FieldValue<'_>) -> Option<FieldError> {
    let fail = |message: &str| {
        Some(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        })
    };

    match (rule, value) {
        (
            FieldRule::Text {
                required,
                max,
                trim,
                required_message,
                too_long_message,
            },
            FieldValue::Text(raw),
        ) => {
            let text = if trim { raw.trim() } else { raw };
            if required && text.is_empty() {
                return fail(required_message);
            }
            if text.chars().count() > max {
                return fail(too_long_message);
            }
            None
        }
        // Absent fields are skipped: create always supplies required text
        // fields (they are plain `String`s), so Missing only occurs on update.
        (FieldRule::Text { .. }, FieldValue::Missing) => None,
        (FieldRule::OneOf { allowed, message }, FieldValue::Text(raw)) => {
            if allowed.contains(&raw) {
                None
            } else {
                fail(message)
            }
        }
        // Enum fields are always present on create; update passes Missing to skip.
        (FieldRule::OneOf { .. }, FieldValue::Missing) => None,
        (FieldRule::DatePattern { message }, FieldValue::Text(raw)) => {
            if DATE_PATTERN.is_match(raw) {
                None
            } else {
                fail(message)
            }
        }
        (FieldRule::DatePattern { .. }, FieldValue::Missing) => None,
        (
            FieldRule::Range {
                min,
                max,
                below_message,
                above_message,
            },
            FieldValue::Number(number),
        ) => {
            if number < min {
                return fail(below_message);
            }
            if number > max {
                return fail(above_message);
            }
            None
        }
        (FieldRule::Range { .. }, FieldValue::Missing) => None,
        // A schema/value shape mismatch is a programming error in this crate.
        _ => fail("Invalid value type"),
    }
}

fn create_value<'a>(input: &'a TaskInput, field: &str) -> FieldValue<'a> {
    match field {
        "title" => FieldValue::Text(&input.title),
        "status" => FieldValue::Text(&input.status),
        "priority" => FieldValue::Text(&input.priority),
        "assignee" => input
            .assignee
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "dueDate" => input
            .due_date
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "progress" => input
            .progress
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Missing),
        _ => FieldValue::Missing,
    }
}

fn patch_value<'a>(patch: &'a TaskPatch, field: &str) -> FieldValue<'a> {
    match field {
        "title" => patch
            .title
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "status" => patch
            .status
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "priority" => patch
            .priority
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "assignee" => patch
            .assignee
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "dueDate" => patch
            .due_date
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
        "progress" => patch
            .progress
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Missing),
        _ => FieldValue::Missing,
    }
}

/// Validates a full task payload. Returns the normalized input (title trimmed)
/// or every field failure at once.
pub fn validate_create(input: &TaskInput) -> Result<TaskInput, ValidationErrors> {
    let mut errors = Vec::new();
    for schema in TASK_SCHEMA {
        if let Some(error) = check(schema.field, schema.rule, create_value(input, schema.field)) {
            errors.push(error);
        }
    }
    if !errors.is_empty() {
        return Err(ValidationErrors { errors });
    }

    let mut normalized = input.clone();
    normalized.title = normalized.title.trim().to_string();
    Ok(normalized)
}

/// Same rules as create, but every absent field is skipped (partial update).
pub fn validate_update(patch: &TaskPatch) -> Result<TaskPatch, ValidationErrors> {
    let mut errors = Vec::new();
    for schema in TASK_SCHEMA {
        if let Some(error) = check(schema.field, schema.rule, patch_value(patch, schema.field)) {
            errors.push(error);
        }
    }
    if !errors.is_empty() {
        return Err(ValidationErrors { errors });
    }

    let mut normalized = patch.clone();
    if let Some(title) = normalized.title.take() {
        normalized.title = Some(title.trim().to_string());
    }
    Ok(normalized)
}
