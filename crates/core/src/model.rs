use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ulid::Ulid;

pub const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;
pub const DEFAULT_IMPORTANCE: i64 = 5;
pub const IMPORTANCE_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// A unit of work submitted to the analysis service.
///
/// Field names match the wire format of both the import text and the analyze
/// request body. Deserialization is lenient: ids and dependencies may be numbers,
/// effort and importance may be numeric strings, and values that cannot be read
/// fall back to the field default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_due_date")]
    pub due_date: Option<String>,
    #[serde(default = "default_hours", deserialize_with = "lenient_hours")]
    pub estimated_hours: f64,
    #[serde(default = "default_importance", deserialize_with = "lenient_importance")]
    pub importance: i64,
    #[serde(default, deserialize_with = "lenient_dependencies")]
    pub dependencies: Vec<String>,
}

impl Task {
    /// Construct a task with a freshly generated, time-ordered id.
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            id: Ulid::new().to_string(),
            title: title.into(),
            due_date: None,
            estimated_hours: DEFAULT_ESTIMATED_HOURS,
            importance: DEFAULT_IMPORTANCE,
            dependencies: Vec::new(),
        }
    }

    pub fn due_label(&self) -> &str {
        match self.due_date.as_deref() {
            Some(due) if !due.trim().is_empty() => due,
            _ => NO_DUE_DATE,
        }
    }
}

pub const NO_DUE_DATE: &str = "—";

fn default_hours() -> f64 {
    DEFAULT_ESTIMATED_HOURS
}

fn default_importance() -> i64 {
    DEFAULT_IMPORTANCE
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_hours<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(DEFAULT_ESTIMATED_HOURS))
}

fn lenient_importance<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let importance = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    };
    Ok(importance.unwrap_or(DEFAULT_IMPORTANCE))
}

/// Accepts an array of strings or numbers, or a single comma-separated string.
fn lenient_dependencies<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let dependencies = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|dep| !dep.is_empty())
            .map(String::from)
            .collect(),
        Value::Number(n) => vec![n.to_string()],
        _ => Vec::new(),
    };
    Ok(dependencies)
}

/// Opaque prioritization selector forwarded verbatim to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strategy(String);

impl Strategy {
    pub const PRESETS: [(&'static str, &'static str); 4] = [
        ("smart", "Smart Balance"),
        ("fastest", "Fastest Wins"),
        ("impact", "High Impact"),
        ("deadline", "Deadline Driven"),
    ];

    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label; strategies outside the preset list fall back to their raw value.
    pub fn label(&self) -> &str {
        Self::PRESETS
            .iter()
            .find(|(key, _)| *key == self.0)
            .map(|(_, label)| *label)
            .unwrap_or(&self.0)
    }

    /// The preset following this one, wrapping around. Unknown strategies restart at the first preset.
    pub fn next_preset(&self) -> Self {
        let position = Self::PRESETS.iter().position(|(key, _)| *key == self.0);
        let next = match position {
            Some(idx) => (idx + 1) % Self::PRESETS.len(),
            None => 0,
        };
        Self::new(Self::PRESETS[next].0)
    }

    pub fn presets() -> impl Iterator<Item = Strategy> {
        Self::PRESETS.iter().map(|(key, _)| Strategy::new(*key))
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new("smart")
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Strategy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

/// Body of an analyze or suggest request.
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub tasks: &'a [Task],
    pub strategy: &'a Strategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub task: Task,
    pub score: f64,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub has_cycle: bool,
    pub results: Vec<AnalysisResult>,
}

/// Top-ranked subset returned by the service's suggest endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub has_cycle: bool,
    pub suggestions: Vec<AnalysisResult>,
}

impl From<SuggestionResponse> for AnalysisResponse {
    fn from(value: SuggestionResponse) -> Self {
        Self {
            has_cycle: value.has_cycle,
            results: value.suggestions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub const HIGH_THRESHOLD: f64 = 75.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            PriorityTier::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            PriorityTier::High => "priority-high",
            PriorityTier::Medium => "priority-medium",
            PriorityTier::Low => "priority-low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
