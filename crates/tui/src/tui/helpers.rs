use std::cmp::min;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::PriorityTier;

pub const BG_BASE: Color = Color::Rgb(14, 17, 23);
pub const BG_PANEL: Color = Color::Rgb(22, 26, 34);
pub const BG_ACCENT: Color = Color::Rgb(32, 37, 47);
pub const FG_ACCENT: Color = Color::Rgb(120, 161, 255);

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn inset_rect(area: Rect, padding: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let px = padding.min(area.width / 2);
    let py = padding.min(area.height / 2);
    Rect {
        x: area.x + px,
        y: area.y + py,
        width: area.width.saturating_sub(px * 2),
        height: area.height.saturating_sub(py * 2),
    }
}

/// First eight chars of an id; ULIDs share their timestamp prefix so keep enough to tell apart.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub fn format_hours(hours: f64) -> String {
    format!("{}h", hours)
}

pub fn tier_style(tier: PriorityTier) -> Style {
    let color = match tier {
        PriorityTier::High => Color::Red,
        PriorityTier::Medium => Color::Yellow,
        PriorityTier::Low => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("j / k or ↓ / ↑", "Move selection"),
        ("a", "Open the add-task form"),
        ("x / Delete", "Remove selected task"),
        ("C", "Clear all tasks (with confirmation)"),
        ("i", "Paste a JSON task list to import"),
        ("s", "Cycle analysis strategy"),
        ("Enter", "Analyze current tasks"),
        ("g", "Ask for the top three suggestions"),
        ("/", "Command palette"),
        ("h / ?", "Toggle this help overlay"),
        ("Esc", "Cancel/close overlays"),
        ("q", "Quit (cancels pending analyses)"),
    ]
}

pub fn accent_title(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
    )])
}
