use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, project_color};
use super::theme::Theme;
use crate::app::App;
use crate::format::{format_clock, format_money};
use crate::report;

const VISIBLE_SESSIONS: usize = 20;

pub fn build_sessions_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();
    let total = app.tracker.timer.sessions().len();
    if total == 0 {
        lines.push(Line::from("No sessions recorded yet."));
        return Text::from(lines);
    }

    lines.push(Line::from(vec![
        Span::styled("  Projects ", Style::default().fg(Theme::dim())),
        Span::styled(
            app.tracker.projects.projects().len().to_string(),
            Style::default().fg(Theme::accent()),
        ),
        Span::styled("   Sessions ", Style::default().fg(Theme::dim())),
        Span::styled(total.to_string(), Style::default().fg(Theme::accent())),
        Span::styled("   Days active ", Style::default().fg(Theme::dim())),
        Span::styled(
            report::days_active(app.tracker.timer.sessions()).to_string(),
            Style::default().fg(Theme::accent()),
        ),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!(
            "  {:<10} {:<11} {:<24} {:>9} {:>10}",
            "Date", "Time", "Project", "Duration", "Earned"
        ),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));

    for session in app.tracker.timer.recent_sessions(VISIBLE_SESSIONS) {
        let project = app.tracker.projects.get(&session.project_id);
        let (name, rate, color) = match project {
            Some(project) => (project.name.as_str(), project.hourly_rate, project_color(project)),
            None => ("Unknown project", 0.0, Theme::dim()),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "  {:<10} {:<11} ",
                    session.start_time.format("%Y-%m-%d").to_string(),
                    format!(
                        "{}-{}",
                        session.start_time.format("%H:%M"),
                        session.end_time.format("%H:%M")
                    )
                ),
                Style::default().fg(Theme::dim()),
            ),
            Span::styled(clamp_name(name, 24), Style::default().fg(color)),
            Span::styled(
                format!(" {:>9}", format_clock(session.duration)),
                Style::default().fg(Theme::accent()),
            ),
            Span::styled(
                format!(
                    " {:>10}",
                    format_money(report::earnings(session.duration, rate), &app.config.currency)
                ),
                Style::default().fg(Theme::success()),
            ),
        ]));
    }

    if total > VISIBLE_SESSIONS {
        lines.push(Line::from(Span::styled(
            format!("  ... and {} older session(s)", total - VISIBLE_SESSIONS),
            Style::default().fg(Theme::dim()),
        )));
    }

    Text::from(lines)
}
