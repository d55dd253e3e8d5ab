use std::collections::HashSet;

use chrono::{Duration, Local, NaiveDate};

use crate::error::{CoreError, Result};
use crate::model::{Task, DEFAULT_ESTIMATED_HOURS, DEFAULT_IMPORTANCE, IMPORTANCE_RANGE};
use crate::store::{StoreChange, TaskStore};

/// Raw, unvalidated form fields for a new task, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub due_date: String,
    pub estimated_hours: String,
    pub importance: String,
    pub dependencies: String,
}

impl Default for TaskInput {
    /// The reset state shown after a successful add.
    fn default() -> Self {
        Self {
            title: String::new(),
            due_date: String::new(),
            estimated_hours: String::from("1"),
            importance: String::from("5"),
            dependencies: String::new(),
        }
    }
}

impl TaskInput {
    pub fn with_title<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Validate `input`, append the resulting task, and return it with the store change.
///
/// On failure the store is not touched.
pub fn add_task(store: &mut TaskStore, input: &TaskInput) -> Result<(Task, StoreChange)> {
    let task = build_task(input)?;
    let change = store.append(task.clone());
    Ok((task, change))
}

pub fn build_task(input: &TaskInput) -> Result<Task> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::validation("title is required"));
    }

    let mut task = Task::new(title);
    task.due_date = parse_due_date(&input.due_date)?;
    task.estimated_hours = parse_hours(&input.estimated_hours)?;
    task.importance = parse_importance(&input.importance)?;
    task.dependencies = parse_dependencies(&input.dependencies);
    Ok(task)
}

fn parse_hours(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_ESTIMATED_HOURS);
    }
    let hours: f64 = trimmed.parse().map_err(|_| {
        CoreError::validation(format!("estimated hours must be a number, got '{}'", trimmed))
    })?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(CoreError::validation(
            "estimated hours must be zero or more",
        ));
    }
    Ok(hours)
}

fn parse_importance(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_IMPORTANCE);
    }
    let importance: i64 = trimmed.parse().map_err(|_| {
        CoreError::validation(format!("importance must be a whole number, got '{}'", trimmed))
    })?;
    if !IMPORTANCE_RANGE.contains(&importance) {
        return Err(CoreError::validation(format!(
            "importance must be between {} and {}",
            IMPORTANCE_RANGE.start(),
            IMPORTANCE_RANGE.end()
        )));
    }
    Ok(importance)
}

/// Split on commas, trim, and drop blanks and repeats while keeping first-seen order.
pub fn parse_dependencies(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed) {
            result.push(trimmed.to_string());
        }
    }
    result
}

fn parse_due_date(raw: &str) -> Result<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let today = Local::now().date_naive();
    let date = parse_date_spec(trimmed, today)?;
    Ok(Some(date.format("%Y-%m-%d").to_string()))
}

/// Resolve `YYYY-MM-DD`, `today`, `tomorrow`, `+Nd` or `+Nw` relative to `today`.
pub fn parse_date_spec(spec: &str, today: NaiveDate) -> Result<NaiveDate> {
    let lower = spec.trim().to_ascii_lowercase();
    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Some(offset) = lower.strip_prefix('+') {
        return parse_relative_spec(offset, today);
    }

    NaiveDate::parse_from_str(spec.trim(), "%Y-%m-%d").map_err(|_| {
        CoreError::validation(format!(
            "Unrecognized due date '{}'. Try YYYY-MM-DD, today, tomorrow, +3d, +2w",
            spec.trim()
        ))
    })
}

const MAX_RELATIVE_OFFSET: i64 = 3650;

fn parse_relative_spec(offset: &str, today: NaiveDate) -> Result<NaiveDate> {
    let invalid = || CoreError::validation(format!("Invalid relative date '+{}'", offset));
    let Some(unit) = offset.chars().last() else {
        return Err(invalid());
    };
    let number_part = &offset[..offset.len() - unit.len_utf8()];
    let value: i64 = number_part.parse().map_err(|_| invalid())?;
    if !(0..=MAX_RELATIVE_OFFSET).contains(&value) {
        return Err(invalid());
    }
    match unit {
        'd' => Ok(today + Duration::days(value)),
        'w' => Ok(today + Duration::weeks(value)),
        other => Err(CoreError::validation(format!(
            "Unsupported relative unit '{}'. Use d or w.",
            other
        ))),
    }
}
