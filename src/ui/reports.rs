use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::clamp_name;
use super::theme::Theme;
use crate::app::App;
use crate::format::{format_hours_minutes, format_money, format_rate};

pub fn build_reports_text(app: &App) -> Text<'_> {
    let report = app.report();
    let currency = app.config.currency.as_str();
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("  Period: ", Style::default().fg(Theme::dim())),
        Span::styled(
            report.filter.period.label(),
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            report
                .window_start
                .map(|start| format!(" since {}", start.format("%a %Y-%m-%d")))
                .unwrap_or_default(),
            Style::default().fg(Theme::dim()),
        ),
        Span::styled("   Client: ", Style::default().fg(Theme::dim())),
        Span::styled(
            report.filter.client.clone().unwrap_or_else(|| "All".to_string()),
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));

    if report.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No sessions in this period.",
            Style::default().fg(Theme::dim()),
        )));
        return Text::from(lines);
    }

    let average = report
        .average_rate()
        .map(|rate| format_rate(rate, currency))
        .unwrap_or_else(|| "-".to_string());
    lines.push(Line::from(vec![
        Span::styled("  Hours ", Style::default().fg(Theme::dim())),
        Span::styled(
            format!("{:.2}", report.total_hours()),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Earnings ", Style::default().fg(Theme::dim())),
        Span::styled(
            format_money(report.total_earnings, currency),
            Style::default()
                .fg(Theme::success())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Sessions ", Style::default().fg(Theme::dim())),
        Span::styled(
            report.session_count.to_string(),
            Style::default().fg(Theme::accent()),
        ),
        Span::styled("   Avg ", Style::default().fg(Theme::dim())),
        Span::styled(average, Style::default().fg(Theme::accent())),
    ]));
    lines.push(Line::from(""));

    lines.push(table_header("Project", "Avg"));
    for summary in &report.by_project {
        lines.push(Line::from(Span::styled(
            format!(
                "  {} {:>8} {:>12} {:>8} {:>8}",
                clamp_name(summary.name(), 24),
                format_hours_minutes(summary.total_seconds),
                format_money(summary.earnings, currency),
                summary.session_count,
                format_hours_minutes(summary.average_session_seconds())
            ),
            Style::default().fg(Theme::text()),
        )));
    }

    lines.push(Line::from(""));
    lines.push(table_header("Client", "Projects"));
    for summary in &report.by_client {
        lines.push(Line::from(Span::styled(
            format!(
                "  {} {:>8} {:>12} {:>8} {:>8}",
                clamp_name(&summary.client, 24),
                format_hours_minutes(summary.total_seconds),
                format_money(summary.earnings, currency),
                summary.session_count,
                summary.project_count()
            ),
            Style::default().fg(Theme::text()),
        )));
    }

    Text::from(lines)
}

fn table_header(first: &str, last: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "  {:<24} {:>8} {:>12} {:>8} {:>8}",
            first, "Time", "Earnings", "Sessions", last
        ),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}
