use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;

pub fn build_help_text() -> Text<'static> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Key bindings",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section_title("Global"));
    lines.extend(section_lines(&[
        "q: Quit",
        "?: Toggle help",
        "Tab/Left/Right or 1-5: Switch view",
        "esc: Dismiss message",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Timer"));
    lines.extend(section_lines(&[
        "space: Start/Stop the timer for the selected project",
        "p: Pause/Resume (paused time is not billed)",
        "x: Reset without recording",
        "Up/Down: Select project",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Projects"));
    lines.extend(section_lines(&[
        "n: New project",
        "d: Delete selected project (sessions are kept)",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Reports"));
    lines.extend(section_lines(&[
        "Shift+Tab: Cycle week/month/all time",
        "c: Cycle client filter",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Sessions"));
    lines.extend(section_lines(&["C: Clear all sessions (asks first)"]));

    lines.push(Line::from(""));
    lines.push(section_title("Popups"));
    lines.extend(section_lines(&[
        "New project: Tab/Up/Down switch field, Enter save, Esc cancel",
        "Confirm: y/Enter confirm, n/Esc cancel",
    ]));

    Text::from(lines)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}

fn section_lines(items: &[&str]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  - {item}"),
                Style::default().fg(Theme::text()),
            ))
        })
        .collect()
}
