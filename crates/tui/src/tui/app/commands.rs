use std::path::Path;

use anyhow::Result;

use crate::core::{AnalysisKind, Strategy};
use crate::tui::constants::COMMAND_HELP;

use super::{App, InputMode};

#[derive(Debug, Clone)]
pub(crate) struct Suggestion {
    pub(crate) fill: String,
    pub(crate) label: String,
}

impl Suggestion {
    fn new<F: Into<String>, L: Into<String>>(fill: F, label: L) -> Self {
        Self {
            fill: fill.into(),
            label: label.into(),
        }
    }
}

impl App {
    pub(crate) fn run_command(&mut self) -> Result<()> {
        let raw = self.input.as_str().trim().to_string();
        self.finish_command();

        let Some(body) = raw.strip_prefix('/') else {
            self.set_status_error("Commands must start with '/'");
            return Ok(());
        };
        let (cmd, rest) = match body.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_ascii_lowercase(), rest.trim()),
            None => (body.to_ascii_lowercase(), ""),
        };

        match cmd.as_str() {
            "" => self.set_status_error("Enter a command after '/'"),
            "help" | "h" => self.set_status_info(COMMAND_HELP),
            "add" => {
                if rest.is_empty() {
                    self.open_add_form();
                } else {
                    self.add_titled(rest);
                }
            }
            "remove" | "rm" | "del" => {
                if rest.is_empty() {
                    self.remove_selected();
                } else {
                    match rest.parse::<usize>() {
                        Ok(position) if position >= 1 => self.remove_at(position - 1),
                        _ => self.set_status_error("Usage: /remove <n> (1-based row number)"),
                    }
                }
            }
            "clear" => self.prompt_clear(),
            "import" => self.open_import(),
            "export" => {
                if rest.is_empty() {
                    self.set_status_error("Usage: /export <path>");
                } else {
                    self.export_to(Path::new(rest));
                }
            }
            "analyze" => self.start_analysis(AnalysisKind::Analyze),
            "suggest" => self.start_analysis(AnalysisKind::Suggest),
            "strategy" => {
                if rest.is_empty() {
                    self.set_status_info(format!(
                        "Strategy: {} ({})",
                        self.strategy.label(),
                        self.strategy
                    ));
                } else {
                    self.set_strategy(rest);
                }
            }
            "cancel" => self.cancel_pending(),
            "quit" | "q" | "exit" => self.quit(),
            unknown => {
                self.set_status_error(format!("Unknown command: {} (try /help)", unknown));
            }
        }

        Ok(())
    }

    pub(crate) fn finish_command(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.suggestion_index = 0;
        self.input_mode = InputMode::Normal;
    }

    pub(crate) fn update_command_suggestions(&mut self) {
        self.suggestions = build_command_suggestions(self);
        if self.suggestion_index >= self.suggestions.len() {
            self.suggestion_index = 0;
        }
    }

    pub(crate) fn accept_suggestion(&mut self) {
        if let Some(s) = self.suggestions.get(self.suggestion_index) {
            self.input.set(s.fill.clone());
            self.update_command_suggestions();
        }
    }
}

fn build_command_suggestions(app: &App) -> Vec<Suggestion> {
    let raw = app.input.as_str();
    let Some(without) = raw.strip_prefix('/') else {
        return Vec::new();
    };
    let without = without.trim_start();
    let (first, rest) = match without.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_ascii_lowercase(), Some(rest.trim())),
        None => (without.to_ascii_lowercase(), None),
    };

    let remove_fill = if app.store.is_empty() {
        String::from("/remove ")
    } else {
        format!("/remove {}", app.selected + 1)
    };

    let base = vec![
        Suggestion::new("/analyze", "📊 Analyze current tasks"),
        Suggestion::new("/suggest", "💡 Top three suggestions"),
        Suggestion::new("/add ", "✚ Add a task by title (empty opens the form)"),
        Suggestion::new(remove_fill, "🗑️ Remove a task by row number"),
        Suggestion::new("/import", "📥 Paste a JSON task list"),
        Suggestion::new("/export ", "💾 Write tasks as JSON to a file"),
        Suggestion::new("/strategy ", "🧭 Choose the analysis strategy"),
        Suggestion::new("/clear", "🧹 Clear all tasks and results"),
        Suggestion::new("/cancel", "✋ Cancel in-flight analyses"),
        Suggestion::new("/help", "❓ Help — show available commands"),
        Suggestion::new("/quit", "🚪 Quit the application"),
    ];

    let Some(rest) = rest else {
        return base
            .into_iter()
            .filter(|s| s.fill[1..].starts_with(&first))
            .collect();
    };

    match first.as_str() {
        "strategy" => {
            let partial = rest.to_ascii_lowercase();
            Strategy::presets()
                .filter(|preset| preset.as_str().starts_with(&partial))
                .map(|preset| {
                    let marker = if preset == app.strategy { " (current)" } else { "" };
                    Suggestion::new(
                        format!("/strategy {}", preset),
                        format!("{}{}", preset.label(), marker),
                    )
                })
                .collect()
        }
        "add" if !rest.is_empty() => {
            vec![Suggestion::new(format!("/add {}", rest), "Add this task")]
        }
        "remove" | "rm" | "del" if rest.is_empty() => match app.store.get(app.selected) {
            Some(task) => vec![Suggestion::new(
                format!("/remove {}", app.selected + 1),
                format!("Selected: {}", task.title),
            )],
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}
