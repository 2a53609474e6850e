use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::project_color;
use super::theme::Theme;
use crate::app::App;
use crate::format::{format_clock, format_hours_minutes, format_money, format_rate};
use crate::report;
use crate::store::TimerState;

pub fn build_timer_text(app: &App) -> Text<'_> {
    let tracker = &app.tracker;
    let mut lines = Vec::new();

    // The run's project wins over the list selection while a draft exists.
    let project = match tracker.timer.draft() {
        Some(_) => tracker.active_project(),
        None => tracker.projects.selected(),
    };

    match project {
        Some(project) => {
            lines.push(Line::from(vec![
                Span::styled("  Project  ", Style::default().fg(Theme::dim())),
                Span::styled(
                    project.name.as_str(),
                    Style::default()
                        .fg(project_color(project))
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Client   ", Style::default().fg(Theme::dim())),
                Span::styled(project.client.as_str(), Style::default().fg(Theme::text())),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Rate     ", Style::default().fg(Theme::dim())),
                Span::styled(
                    format_rate(project.hourly_rate, &app.config.currency),
                    Style::default().fg(Theme::accent()),
                ),
            ]));
        }
        None if tracker.timer.draft().is_some() => {
            lines.push(Line::from(Span::styled(
                "  The running project was deleted. Stop or reset the timer.",
                Style::default().fg(Theme::warn()),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  No projects yet. Press 'n' to create one.",
                Style::default().fg(Theme::dim()),
            )));
        }
    }

    lines.push(Line::from(""));
    let (state_label, state_style) = match tracker.timer.state() {
        TimerState::Idle => ("IDLE", Style::default().fg(Theme::dim())),
        TimerState::Running { .. } => ("RUNNING", Style::default().fg(Theme::active())),
        TimerState::Paused { .. } => ("PAUSED", Style::default().fg(Theme::warn())),
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format_clock(tracker.timer.elapsed_seconds()),
            state_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(state_label, state_style),
    ]));

    if let (Some(project), true) = (project, tracker.timer.draft().is_some()) {
        let earned = report::earnings(tracker.timer.elapsed_seconds(), project.hourly_rate);
        lines.push(Line::from(Span::styled(
            format!("  {} so far", format_money(earned, &app.config.currency)),
            Style::default().fg(Theme::success()),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Today    ", Style::default().fg(Theme::dim())),
        Span::styled(
            format_hours_minutes(tracker.today_seconds()),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    Text::from(lines)
}
