use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use crate::core::render::ResultsView;
use crate::tui::constants::APP_VERSION;
use crate::tui::form::FormField;
use crate::tui::helpers::{
    accent_title, build_help_lines, centered_rect, format_hours, inset_rect, short_id,
    tier_style, BG_ACCENT, BG_BASE, BG_PANEL,
};

use super::{App, ConfirmChoice, InputMode};

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_body(f, chunks[1]);
        self.draw_footer(f, chunks[2]);

        match self.input_mode {
            InputMode::Add => self.draw_form_overlay(f, size),
            InputMode::Import => self.draw_import_overlay(f, size),
            InputMode::Command => self.draw_command_overlay(f, size),
            InputMode::Help => self.draw_help_overlay(f, size),
            InputMode::ConfirmClear => self.draw_confirm_overlay(f, size),
            InputMode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let mut left_spans = vec![
            Span::styled(
                format!(" taskrank v{} ", APP_VERSION),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "— {} task{}",
                self.store.len(),
                if self.store.len() == 1 { "" } else { "s" }
            )),
            Span::raw("  "),
            Span::styled(
                format!("🧭 {}", self.strategy.label()),
                Style::default().fg(Color::Cyan),
            ),
        ];

        if !self.import_buffer.is_blank() {
            left_spans.push(Span::raw("  "));
            left_spans.push(Span::styled(
                "📥 import pending",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        if self.is_analyzing() {
            left_spans.push(Span::raw("  "));
            left_spans.push(Span::styled(
                format!("⏳ analyzing ({})", self.pending.len()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        f.render_widget(
            Paragraph::new(Line::from(left_spans)).style(Style::default().bg(BG_BASE)),
            cols[0],
        );

        let right = Paragraph::new(Line::from(vec![Span::styled(
            format!("🌐 {} ", self.config.api_base_url()),
            Style::default().fg(Color::DarkGray),
        )]))
        .alignment(Alignment::Right)
        .style(Style::default().bg(BG_BASE));
        f.render_widget(right, cols[1]);
    }

    fn draw_body(&mut self, f: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_tasks(f, cols[0]);
        self.draw_results(f, cols[1]);
    }

    fn draw_tasks(&mut self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("Tasks"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));

        if self.store.is_empty() {
            let lines = vec![
                Line::from(Span::styled(
                    "No tasks yet ✨",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::default(),
                Line::from("Press 'a' to add a task or 'i' to paste a JSON list."),
                Line::from("Use '/' to explore commands."),
            ];
            let inner = block.inner(area);
            f.render_widget(block, area);
            if inner.width == 0 || inner.height == 0 {
                return;
            }
            let content = centered_rect(inner.width.min(60), 6, inner);
            f.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: true })
                    .alignment(Alignment::Center)
                    .style(Style::default().bg(BG_PANEL)),
                content,
            );
            return;
        }

        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from("📝 Title"),
            Cell::from("🆔 ID"),
            Cell::from("⏰ Due"),
            Cell::from("⌛ Est"),
            Cell::from("⭐ Imp"),
            Cell::from("🔗 Deps"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .store
            .tasks()
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                Row::new(vec![
                    Cell::from((idx + 1).to_string()),
                    Cell::from(task.title.clone()),
                    Cell::from(short_id(&task.id)),
                    Cell::from(task.due_label().to_string()),
                    Cell::from(format_hours(task.estimated_hours)),
                    Cell::from(task.importance.to_string()),
                    Cell::from(task.dependencies.len().to_string()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(7),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_results(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("Analysis"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = match &self.results {
            Some(view) => results_lines(view),
            None if self.is_analyzing() => vec![Line::from(Span::styled(
                "Analyzing…",
                Style::default().fg(Color::Yellow),
            ))],
            None => vec![
                Line::from("No analysis yet."),
                Line::from(Span::styled(
                    "Press Enter to analyze or 'g' for suggestions.",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        };

        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.style())])
        } else {
            Line::from(vec![Span::raw("Ready")])
        };
        f.render_widget(Paragraph::new(status_line), lines[0]);

        let help = match self.input_mode {
            InputMode::Normal => {
                "j/k move | a add ✚ | x remove 🗑️ | C clear 🧹 | i import 📥 | s strategy 🧭 | Enter analyze 📊 | g suggest 💡 | / command ⌨️ | h help ❔ | q quit"
            }
            InputMode::Add => "Tab/↑/↓ switch field • Enter to add ✍️ • Esc to close",
            InputMode::Import => "Paste JSON • Enter import • Ctrl+U clear • Esc keep and close",
            InputMode::Command => {
                "Up/Down navigate • Tab/Right complete • Enter select/run • Esc cancel"
            }
            InputMode::Help => "Enter/Esc to close ❔",
            InputMode::ConfirmClear => "←/→ choose • Space toggle • Enter confirm • Esc cancel",
        };
        let help_line = Line::from(vec![Span::styled(
            help,
            Style::default().fg(Color::DarkGray),
        )]);
        f.render_widget(Paragraph::new(help_line), lines[1]);
    }

    fn draw_form_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 80);
        let height = FormField::ALL.len() as u16 * 2 + 3;
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("➕ Add Task"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let mut lines = Vec::new();
        for field in FormField::ALL {
            let focused = self.form.focus() == field;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            let buffer = self.form.field(field);
            let mut spans = vec![
                Span::styled(if focused { "▶ " } else { "  " }, label_style),
                Span::styled(format!("{:<11}", field.label()), label_style),
            ];
            if focused {
                let (before, after) = buffer.split_at_cursor();
                spans.push(Span::raw(before.to_string()));
                spans.push(Span::styled(
                    "▏",
                    Style::default().fg(Color::Yellow),
                ));
                spans.push(Span::raw(after.to_string()));
            } else {
                spans.push(Span::raw(buffer.as_str().to_string()));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(Span::styled(
                format!("             {}", field.hint()),
                Style::default().fg(Color::DarkGray),
            )));
        }

        f.render_widget(
            Paragraph::new(lines).style(Style::default().bg(BG_PANEL)),
            inner,
        );
    }

    fn draw_import_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(8), 100);
        let height = min(area.height.saturating_sub(4), 20);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let title = format!(
            "📥 Import JSON ({} line{})",
            self.import_buffer.line_count(),
            if self.import_buffer.line_count() == 1 { "" } else { "s" }
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let content = if self.import_buffer.is_blank() {
            Paragraph::new(Line::from(Span::styled(
                r#"[{"id": "1", "title": "Write report", "due_date": "2025-06-01", "estimated_hours": 2, "importance": 8, "dependencies": []}]"#,
                Style::default().fg(Color::DarkGray),
            )))
        } else {
            let (line, _) = self.import_buffer.cursor_line_col();
            let scroll = (line as u16).saturating_sub(inner.height.saturating_sub(1));
            Paragraph::new(self.import_buffer.as_str()).scroll((scroll, 0))
        };
        f.render_widget(
            content
                .wrap(Wrap { trim: false })
                .style(Style::default().bg(BG_PANEL)),
            inner,
        );
    }

    fn draw_command_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 80);
        let height = 5 + self.suggestions.len().min(8) as u16;
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let inner = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(popup_area);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Command"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let input_area = input_block.inner(inner[0]);
        f.render_widget(input_block, inner[0]);
        f.render_widget(
            Paragraph::new(self.input.as_str()).style(Style::default().bg(BG_PANEL)),
            input_area,
        );

        let mut lines: Vec<Line> = vec![Line::from(vec![Span::styled(
            "Suggestions",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )])];
        for (i, s) in self.suggestions.iter().enumerate() {
            let style = if i == self.suggestion_index {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(s.fill.as_str(), style.add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(s.label.as_str(), Style::default().fg(Color::DarkGray)),
            ]));
        }
        f.render_widget(Clear, inner[1]);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(BG_PANEL)),
            inner[1],
        );
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 80);
        let height = min(lines.len() as u16 + 4, area.height.saturating_sub(2)).max(10);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Keyboard Reference"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_lines: Vec<Line> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Line::from(vec![
                    Span::styled(format!("{:<16}", combo), Style::default().fg(Color::Cyan)),
                    Span::raw(desc),
                ])
            })
            .collect();

        f.render_widget(
            Paragraph::new(help_lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }

    fn draw_confirm_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(20), 60).max(40);
        let popup_area = centered_rect(width, 8, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🧹 Clear All"))
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let yes_style = if self.confirm_choice == ConfirmChoice::Yes {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        };
        let no_style = if self.confirm_choice == ConfirmChoice::No {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let lines = vec![
            Line::from(Span::styled(
                "Tasks, results and pending import text will be discarded.",
                Style::default().fg(Color::Red),
            )),
            Line::from(format!(
                "Clear {} task{}?",
                self.store.len(),
                if self.store.len() == 1 { "" } else { "s" }
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("  Yes  ", yes_style),
                Span::raw("    "),
                Span::styled("  No  ", no_style),
            ]),
        ];

        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center)
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }
}

/// Styled lines for a results view: strategy, cycle warning, then one card per entry.
fn results_lines(view: &ResultsView) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled("Strategy Used: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            view.strategy_label.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    if let Some(warning) = view.cycle_warning {
        lines.push(Line::from(Span::styled(
            format!("⚠️  {}", warning),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )));
    }

    if view.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from("No results returned."));
        return lines;
    }

    for entry in &view.entries {
        let style = tier_style(entry.tier);
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", entry.tier.as_str().to_ascii_uppercase()),
                style,
            ),
            Span::styled(
                entry.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  (Score: {})", entry.score), style),
        ]));
        lines.push(Line::from(format!("  {}", entry.explanation)));
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.detail_line()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AnalysisResponse, AnalysisResult, Task};
    use crate::core::render;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn warning_line_comes_right_after_strategy() {
        let view = render(
            &AnalysisResponse {
                has_cycle: true,
                results: vec![AnalysisResult {
                    task: Task::new("Write report"),
                    score: 82.0,
                    explanation: "urgent".into(),
                }],
            },
            "Deadline Driven",
        );
        let lines = results_lines(&view);

        assert_eq!(line_text(&lines[0]), "Strategy Used: Deadline Driven");
        assert!(line_text(&lines[1]).contains("Circular dependency"));
        assert_eq!(line_text(&lines[3]), "[HIGH] Write report  (Score: 82)");
        assert_eq!(lines[3].spans[0].style, tier_style(crate::core::PriorityTier::High));
    }

    #[test]
    fn empty_view_shows_placeholder() {
        let view = render(
            &AnalysisResponse {
                has_cycle: false,
                results: vec![],
            },
            "Smart Balance",
        );
        let lines = results_lines(&view);
        assert_eq!(line_text(lines.last().unwrap()), "No results returned.");
    }
}
