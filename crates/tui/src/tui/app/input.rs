use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::AnalysisKind;
use crate::tui::constants::STATUS_COMMAND_PALETTE;

use super::{App, ConfirmChoice, InputMode};

#[derive(Debug, Clone, Copy)]
pub(crate) enum NormalAction {
    Quit,
    EnterAdd,
    EnterImport,
    EnterCommand,
    ShowHelp,
    RemoveSelected,
    ClearAll,
    CycleStrategy,
    Analyze,
    Suggest,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
}

impl NormalAction {
    fn from_event(key: &KeyEvent) -> Option<Self> {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('a') => Some(Self::EnterAdd),
            KeyCode::Char('i') => Some(Self::EnterImport),
            KeyCode::Char('/') => Some(Self::EnterCommand),
            KeyCode::Char('h') | KeyCode::Char('?') => Some(Self::ShowHelp),
            KeyCode::Char('x') | KeyCode::Delete => Some(Self::RemoveSelected),
            KeyCode::Char('C') => Some(Self::ClearAll),
            KeyCode::Char('s') => Some(Self::CycleStrategy),
            KeyCode::Enter => Some(Self::Analyze),
            KeyCode::Char('g') => Some(Self::Suggest),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Home => Some(Self::SelectFirst),
            KeyCode::End => Some(Self::SelectLast),
            _ => None,
        }
    }
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Add => self.handle_add_mode(key),
            InputMode::Import => self.handle_import_mode(key),
            InputMode::Command => self.handle_command_mode(key),
            InputMode::Help => self.handle_help_mode(key),
            InputMode::ConfirmClear => self.handle_confirm_clear_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(action) = NormalAction::from_event(&key) {
            self.execute_normal_action(action);
        }
        Ok(())
    }

    fn execute_normal_action(&mut self, action: NormalAction) {
        match action {
            NormalAction::Quit => self.quit(),
            NormalAction::EnterAdd => self.open_add_form(),
            NormalAction::EnterImport => self.open_import(),
            NormalAction::EnterCommand => {
                self.input_mode = InputMode::Command;
                self.input.set("/");
                self.update_command_suggestions();
                self.set_status_info(STATUS_COMMAND_PALETTE);
            }
            NormalAction::ShowHelp => self.show_help_overlay(),
            NormalAction::RemoveSelected => self.remove_selected(),
            NormalAction::ClearAll => self.prompt_clear(),
            NormalAction::CycleStrategy => self.cycle_strategy(),
            NormalAction::Analyze => self.start_analysis(AnalysisKind::Analyze),
            NormalAction::Suggest => self.start_analysis(AnalysisKind::Suggest),
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::SelectFirst => self.select_first(),
            NormalAction::SelectLast => self.select_last(),
        }
    }

    fn handle_add_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => self.submit_form(),
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Backspace => self.form.focused_mut().backspace(),
            KeyCode::Delete => self.form.focused_mut().delete_char(),
            KeyCode::Left => self.form.focused_mut().move_left(),
            KeyCode::Right => self.form.focused_mut().move_right(),
            KeyCode::Home => self.form.focused_mut().move_home(),
            KeyCode::End => self.form.focused_mut().move_end(),
            KeyCode::Char(c) => self.form.focused_mut().insert_char(c),
            _ => {}
        }
        Ok(())
    }

    fn handle_import_mode(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('u') = key.code {
                self.import_buffer.clear();
                self.set_status_info("Import box cleared");
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => self.apply_import(),
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                if self.import_buffer.is_blank() {
                    self.status = None;
                } else {
                    self.set_status_info("Import text kept; it replaces the list on next analyze");
                }
            }
            KeyCode::Backspace => self.import_buffer.backspace(),
            KeyCode::Delete => self.import_buffer.delete_char(),
            KeyCode::Left => self.import_buffer.move_left(),
            KeyCode::Right => self.import_buffer.move_right(),
            KeyCode::Home => self.import_buffer.move_home(),
            KeyCode::End => self.import_buffer.move_end(),
            KeyCode::Tab => self.import_buffer.insert_str("  "),
            KeyCode::Char(c) => self.import_buffer.insert_char(c),
            _ => {}
        }
        Ok(())
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Result<()> {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('h') | KeyCode::Char('?')
        ) {
            self.input_mode = InputMode::Normal;
            self.status = None;
        }
        Ok(())
    }

    fn handle_confirm_clear_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.set_status_info("Clear cancelled");
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                self.confirm_choice = self.confirm_choice.toggle();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                if self.confirm_choice == ConfirmChoice::Yes {
                    self.perform_clear();
                } else {
                    self.set_status_info("Clear cancelled");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => {
                if let Some(s) = self.suggestions.get(self.suggestion_index) {
                    let fill = s.fill.clone();
                    self.input.set(fill.clone());
                    if fill.ends_with(' ') {
                        self.update_command_suggestions();
                        return Ok(());
                    }
                }
                self.run_command()
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.status = None;
                Ok(())
            }
            KeyCode::Backspace => {
                self.input.backspace();
                self.update_command_suggestions();
                Ok(())
            }
            KeyCode::Delete => {
                self.input.delete_char();
                self.update_command_suggestions();
                Ok(())
            }
            KeyCode::Char(c) => {
                self.input.insert_char(c);
                self.update_command_suggestions();
                Ok(())
            }
            KeyCode::Tab | KeyCode::Right => {
                self.accept_suggestion();
                Ok(())
            }
            KeyCode::Up => {
                if !self.suggestions.is_empty() {
                    if self.suggestion_index == 0 {
                        self.suggestion_index = self.suggestions.len() - 1;
                    } else {
                        self.suggestion_index -= 1;
                    }
                }
                Ok(())
            }
            KeyCode::Down => {
                if !self.suggestions.is_empty() {
                    self.suggestion_index = (self.suggestion_index + 1) % self.suggestions.len();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
