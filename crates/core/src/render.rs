use std::fmt;

use serde::Serialize;

use crate::model::{AnalysisResponse, AnalysisResult, PriorityTier, SuggestionResponse, Task};

pub const CYCLE_WARNING: &str = "Warning: Circular dependency detected!";

/// One rendered result card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub title: String,
    pub score: f64,
    pub explanation: String,
    pub due: String,
    pub estimated_hours: f64,
    pub importance: i64,
    pub tier: PriorityTier,
}

impl From<&AnalysisResult> for ResultEntry {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            title: result.task.title.clone(),
            score: result.score,
            explanation: result.explanation.clone(),
            due: result.task.due_label().to_string(),
            estimated_hours: result.task.estimated_hours,
            importance: result.task.importance,
            tier: PriorityTier::from_score(result.score),
        }
    }
}

impl ResultEntry {
    pub fn detail_line(&self) -> String {
        format!(
            "Due: {} | Effort: {}h | Importance: {}",
            self.due, self.estimated_hours, self.importance
        )
    }
}

/// Presentation-ready analysis output. Replaces whatever was shown before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub strategy_label: String,
    pub cycle_warning: Option<&'static str>,
    pub entries: Vec<ResultEntry>,
}

impl ResultsView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_by_tier(&self, tier: PriorityTier) -> usize {
        self.entries.iter().filter(|entry| entry.tier == tier).count()
    }
}

/// Build the results view in the order the service returned them.
pub fn render(response: &AnalysisResponse, strategy_label: &str) -> ResultsView {
    ResultsView {
        strategy_label: strategy_label.to_string(),
        cycle_warning: response.has_cycle.then_some(CYCLE_WARNING),
        entries: response.results.iter().map(ResultEntry::from).collect(),
    }
}

pub fn render_suggestions(response: &SuggestionResponse, strategy_label: &str) -> ResultsView {
    ResultsView {
        strategy_label: strategy_label.to_string(),
        cycle_warning: response.has_cycle.then_some(CYCLE_WARNING),
        entries: response.suggestions.iter().map(ResultEntry::from).collect(),
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy Used: {}", self.strategy_label)?;
        if let Some(warning) = self.cycle_warning {
            writeln!(f, "{}", warning)?;
        }
        if self.entries.is_empty() {
            writeln!(f, "No results returned.")?;
        }
        for entry in &self.entries {
            writeln!(f)?;
            writeln!(
                f,
                "[{}] {} (Score: {})",
                entry.tier.as_str().to_ascii_uppercase(),
                entry.title,
                entry.score
            )?;
            writeln!(f, "  {}", entry.explanation)?;
            writeln!(f, "  {}", entry.detail_line())?;
        }
        Ok(())
    }
}

/// Listing line for the current task collection.
pub fn task_line(task: &Task) -> String {
    format!(
        "{} [ID: {}] Due: {} | Effort: {}h | Importance: {}",
        task.title,
        task.id,
        task.due_label(),
        task.estimated_hours,
        task.importance
    )
}
