use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ratatui::style::{Color, Style};
use ratatui::widgets::TableState;
use tokio::runtime::Handle;

use super::buffer::TextBuffer;
use super::constants::*;
use super::form::TaskForm;
use crate::config::AppConfig;
use crate::core::render::render as render_results;
use crate::core::{
    add_task, export_tasks, import_tasks, prepare_snapshot, spawn_analysis, AnalysisKind,
    AnalysisOutcome, AnalysisService, CoreError, ImportOutcome, PendingAnalysis, ResultsView,
    ServiceError, StoreChange, Strategy, TaskStore,
};

mod commands;
mod input;
mod render;

use commands::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Add,
    Import,
    Command,
    Help,
    ConfirmClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    fn toggle(self) -> Self {
        match self {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

pub(crate) struct App {
    config: AppConfig,
    runtime: Handle,
    service: Arc<dyn AnalysisService>,
    store: TaskStore,
    selected: usize,
    table_state: TableState,
    form: TaskForm,
    import_buffer: TextBuffer,
    results: Option<ResultsView>,
    pending: Vec<PendingAnalysis>,
    strategy: Strategy,
    input_mode: InputMode,
    input: TextBuffer,
    suggestions: Vec<Suggestion>,
    suggestion_index: usize,
    status: Option<StatusMessage>,
    confirm_choice: ConfirmChoice,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(
        config: AppConfig,
        runtime: Handle,
        service: Arc<dyn AnalysisService>,
    ) -> Self {
        let strategy = config.default_strategy().clone();
        Self {
            config,
            runtime,
            service,
            store: TaskStore::new(),
            selected: 0,
            table_state: TableState::default(),
            form: TaskForm::default(),
            import_buffer: TextBuffer::new(),
            results: None,
            pending: Vec::new(),
            strategy,
            input_mode: InputMode::Normal,
            input: TextBuffer::new(),
            suggestions: Vec::new(),
            suggestion_index: 0,
            status: None,
            confirm_choice: ConfirmChoice::No,
            should_quit: false,
        }
    }

    pub(crate) fn api_base_url(&self) -> &str {
        self.config.api_base_url()
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn on_tick(&mut self) {
        self.poll_analyses();
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn on_paste(&mut self, text: &str) {
        match self.input_mode {
            InputMode::Add => {
                let single_line = text.replace(['\r', '\n'], " ");
                self.form.focused_mut().insert_str(single_line.trim_end());
            }
            InputMode::Command => {
                self.input.insert_str(&text.replace(['\r', '\n'], " "));
                self.update_command_suggestions();
            }
            InputMode::Import => self.import_buffer.insert_str(text),
            InputMode::Normal => {
                self.open_import();
                self.import_buffer.insert_str(text);
            }
            InputMode::Help | InputMode::ConfirmClear => {}
        }
    }

    fn sync_selection(&mut self) {
        if self.store.is_empty() {
            self.selected = 0;
            self.table_state.select(None);
        } else {
            self.selected = self.selected.min(self.store.len() - 1);
            self.table_state.select(Some(self.selected));
        }
    }

    fn select_next(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.store.len() - 1);
        self.table_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.table_state.select(Some(self.selected));
    }

    fn select_first(&mut self) {
        self.selected = 0;
        self.sync_selection();
    }

    fn select_last(&mut self) {
        self.selected = self.store.len().saturating_sub(1);
        self.sync_selection();
    }

    fn open_add_form(&mut self) {
        self.input_mode = InputMode::Add;
        self.set_status_info(STATUS_ENTER_ADD);
    }

    fn open_import(&mut self) {
        self.input_mode = InputMode::Import;
        self.set_status_info(STATUS_ENTER_IMPORT);
    }

    fn show_help_overlay(&mut self) {
        self.input_mode = InputMode::Help;
        self.set_status_info(STATUS_HELP);
    }

    fn submit_form(&mut self) {
        let input = self.form.to_input();
        match add_task(&mut self.store, &input) {
            Ok((task, change)) => {
                self.form.reset();
                if let StoreChange::Appended { index } = change {
                    self.selected = index;
                }
                self.sync_selection();
                self.set_status_info(format!("{}: {}", change.describe(), task.title));
            }
            Err(err) => self.set_status_error(err.to_string()),
        }
    }

    fn add_titled(&mut self, title: &str) {
        self.form.reset();
        self.form.focused_mut().set(title);
        self.submit_form();
    }

    fn remove_selected(&mut self) {
        if self.store.is_empty() {
            self.set_status_info(STATUS_NOTHING_TO_REMOVE);
            return;
        }
        self.remove_at(self.selected);
    }

    fn remove_at(&mut self, index: usize) {
        match self.store.remove(index) {
            Ok(change) => {
                self.sync_selection();
                self.set_status_info(change.describe());
            }
            Err(err) => self.set_status_error(err.to_string()),
        }
    }

    fn prompt_clear(&mut self) {
        if self.store.is_empty() && self.results.is_none() {
            self.set_status_info("Nothing to clear");
            return;
        }
        self.confirm_choice = ConfirmChoice::No;
        self.input_mode = InputMode::ConfirmClear;
        self.set_status_info(STATUS_CONFIRM_CLEAR);
    }

    /// Empties tasks, results and the import box. In-flight requests keep running.
    fn perform_clear(&mut self) {
        let change = self.store.clear();
        self.results = None;
        self.import_buffer.clear();
        self.sync_selection();
        self.set_status_info(change.describe());
    }

    fn apply_import(&mut self) {
        match import_tasks(&mut self.store, self.import_buffer.as_str()) {
            Ok(ImportOutcome::NotRequested) => {
                self.set_status_error("Paste a JSON array of tasks first");
            }
            Ok(ImportOutcome::Replaced { change, .. }) => {
                self.import_buffer.clear();
                self.input_mode = InputMode::Normal;
                self.select_first();
                self.set_status_info(change.describe());
            }
            Err(err) => self.set_status_error(err.to_string()),
        }
    }

    /// Import any pending text, snapshot the store and send it off.
    fn start_analysis(&mut self, kind: AnalysisKind) {
        let (snapshot, outcome) =
            match prepare_snapshot(&mut self.store, self.import_buffer.as_str()) {
                Ok(prepared) => prepared,
                Err(err) => {
                    self.set_status_error(err.to_string());
                    return;
                }
            };
        if let ImportOutcome::Replaced { .. } = outcome {
            self.import_buffer.clear();
            self.select_first();
        }

        let count = snapshot.len();
        let pending = spawn_analysis(
            &self.runtime,
            Arc::clone(&self.service),
            kind,
            snapshot,
            self.strategy.clone(),
        );
        self.pending.push(pending);
        self.set_status_info(format!(
            "Running {} on {} task{} with {}…",
            kind.as_str(),
            count,
            if count == 1 { "" } else { "s" },
            self.strategy.label()
        ));
    }

    fn poll_analyses(&mut self) {
        let mut finished = Vec::new();
        self.pending.retain_mut(|pending| match pending.try_take() {
            Some(outcome) => {
                finished.push(outcome);
                false
            }
            None => true,
        });
        for outcome in finished {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: AnalysisOutcome) {
        match outcome.result {
            Ok(response) => {
                let view = render_results(&response, outcome.strategy.label());
                tracing::info!(
                    sequence = outcome.sequence,
                    count = view.entries.len(),
                    has_cycle = response.has_cycle,
                    "analysis rendered"
                );
                self.set_status_info(format!(
                    "{} finished: {} result{}",
                    outcome.kind.as_str(),
                    view.entries.len(),
                    if view.entries.len() == 1 { "" } else { "s" }
                ));
                self.results = Some(view);
            }
            Err(CoreError::Service(ServiceError::Cancelled)) => {
                self.set_status_info(format!("{} cancelled", outcome.kind.as_str()));
            }
            Err(err) => {
                tracing::warn!(sequence = outcome.sequence, error = %err, "analysis failed");
                self.set_status_error(err.to_string());
            }
        }
    }

    fn cancel_pending(&mut self) {
        if self.pending.is_empty() {
            self.set_status_info("No analysis in progress");
            return;
        }
        let count = self.cancel_all();
        self.set_status_info(format!(
            "Cancelling {} request{}",
            count,
            if count == 1 { "" } else { "s" }
        ));
    }

    pub(crate) fn cancel_all(&mut self) -> usize {
        for pending in &self.pending {
            pending.cancel();
        }
        self.pending.len()
    }

    fn quit(&mut self) {
        self.cancel_all();
        self.should_quit = true;
    }

    fn cycle_strategy(&mut self) {
        self.strategy = self.strategy.next_preset();
        self.set_status_info(format!("Strategy: {}", self.strategy.label()));
    }

    fn set_strategy(&mut self, name: &str) {
        let strategy = Strategy::new(name.trim());
        let known = Strategy::presets().any(|preset| preset == strategy);
        self.strategy = strategy;
        if known {
            self.set_status_info(format!("Strategy: {}", self.strategy.label()));
        } else {
            self.set_status_info(format!(
                "Strategy '{}' is not a preset; the service decides how to treat it",
                self.strategy
            ));
        }
    }

    fn export_to(&mut self, path: &Path) {
        let written = export_tasks(self.store.tasks())
            .map_err(anyhow::Error::from)
            .and_then(|json| {
                std::fs::write(path, json)
                    .map_err(|err| anyhow::anyhow!("Failed to write {}: {}", path.display(), err))
            });
        match written {
            Ok(()) => {
                tracing::info!(count = self.store.len(), path = %path.display(), "exported tasks");
                self.set_status_info(format!(
                    "Exported {} task{} to {}",
                    self.store.len(),
                    if self.store.len() == 1 { "" } else { "s" },
                    path.display()
                ));
            }
            Err(err) => self.set_status_error(err.to_string()),
        }
    }

    fn is_analyzing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("ℹ️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("⚠️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}
