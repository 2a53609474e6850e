use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, project_color};
use super::theme::Theme;
use crate::app::App;
use crate::format::{format_hours_minutes, format_rate};
use crate::report::{Period, ReportFilter};

pub fn build_projects_text(app: &App) -> Text<'_> {
    let mut lines = Vec::new();
    let projects = app.tracker.projects.projects();

    if projects.is_empty() {
        lines.push(Line::from("No projects yet. Press 'n' to create one."));
        return Text::from(lines);
    }

    let all_time = app.tracker.report(&ReportFilter {
        period: Period::All,
        client: None,
    });
    let selected = app.selected_index();
    let active_id = app.tracker.timer.draft().map(|draft| draft.project_id.as_str());

    lines.push(Line::from(Span::styled(
        format!(
            "  {:<24} {:<18} {:>10} {:>8}",
            "Project", "Client", "Rate", "Total"
        ),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "  {:<24} {:<18} {:>10} {:>8}",
            "------------------------", "------------------", "----------", "--------"
        ),
        Style::default().fg(Theme::dim()),
    )));

    for (index, project) in projects.iter().enumerate() {
        let is_selected = selected == Some(index);
        let total = all_time
            .by_project
            .iter()
            .find(|summary| summary.project_id == project.id)
            .map(|summary| summary.total_seconds)
            .unwrap_or(0);
        let marker = if active_id == Some(project.id.as_str()) {
            "● "
        } else if is_selected {
            "> "
        } else {
            "  "
        };
        let mut name_style = Style::default().fg(project_color(project));
        if is_selected {
            name_style = name_style.add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(vec![
            Span::styled(
                marker,
                Style::default()
                    .fg(Theme::selection_marker())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(clamp_name(&project.name, 24), name_style),
            Span::raw(" "),
            Span::styled(
                clamp_name(&project.client, 18),
                Style::default().fg(Theme::text()),
            ),
            Span::styled(
                format!(
                    " {:>10}",
                    format_rate(project.hourly_rate, &app.config.currency)
                ),
                Style::default().fg(Theme::accent()),
            ),
            Span::styled(
                format!(" {:>8}", format_hours_minutes(total)),
                Style::default().fg(Theme::dim()),
            ),
        ]));
    }

    Text::from(lines)
}
