mod help;
mod helpers;
mod projects;
mod reports;
mod sessions;
mod theme;
mod timer;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, AppView, ConfirmPopup, NewProjectPopup, ProjectField, TABS};
use crate::format::format_clock;
use crate::store::TimerState;
use theme::Theme;

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let body_text = match app.view {
        AppView::Timer => timer::build_timer_text(app),
        AppView::Projects => projects::build_projects_text(app),
        AppView::Reports => reports::build_reports_text(app),
        AppView::Sessions => sessions::build_sessions_text(app),
        AppView::Help => help::build_help_text(),
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let header = Paragraph::new(Text::from(vec![header_line(app)]))
        .alignment(Alignment::Left)
        .block(bordered());
    frame.render_widget(header, layout[0]);

    let mut body_lines = vec![
        tabs_line(app),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", app.view.title()),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    body_lines.extend(body_text.lines);
    body_lines.push(Line::from(""));
    body_lines.push(Line::from(Span::styled(
        "----------------------------------------",
        Style::default().fg(Theme::dim()),
    )));
    body_lines.extend(keybinds_lines(app));
    let body = Paragraph::new(Text::from(body_lines))
        .style(Style::default().fg(Theme::text()))
        .alignment(Alignment::Left)
        .block(bordered());
    frame.render_widget(body, layout[1]);

    let footer = Paragraph::new(Text::from(status_line(app)))
        .alignment(Alignment::Left)
        .block(bordered());
    frame.render_widget(footer, layout[2]);

    if let Some(popup) = &app.new_project_popup {
        render_new_project_popup(frame, popup);
    }
    if let Some(popup) = &app.confirm_popup {
        render_confirm_popup(frame, popup);
    }
}

fn bordered() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Theme::secondary()))
}

fn header_line(app: &App) -> Line<'_> {
    let (indicator, style) = match app.tracker.timer.state() {
        TimerState::Idle => ("● idle", Style::default().fg(Theme::dim())),
        TimerState::Running { .. } => (
            "● running",
            Style::default()
                .fg(Theme::active())
                .add_modifier(Modifier::BOLD),
        ),
        TimerState::Paused { .. } => (
            "● paused",
            Style::default()
                .fg(Theme::warn())
                .add_modifier(Modifier::BOLD),
        ),
    };
    Line::from(vec![
        Span::styled(
            "  Billable  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            "time tracker",
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(indicator, style),
    ])
}

fn tabs_line(app: &App) -> Line<'_> {
    let mut spans = Vec::new();
    for (index, view) in TABS.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if *view == app.view {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        spans.push(Span::styled(
            format!(" {} {} ", index + 1, view.title()),
            style,
        ));
    }
    Line::from(spans)
}

/// Status message if there is one, otherwise the live run.
fn status_line(app: &App) -> Line<'_> {
    if let Some(status) = &app.status {
        return Line::from(Span::styled(
            status.as_str(),
            Style::default()
                .fg(Theme::warn())
                .add_modifier(Modifier::BOLD),
        ));
    }
    let Some(draft) = app.tracker.timer.draft() else {
        return Line::from(Span::styled(
            "● No timer running",
            Style::default().fg(Theme::dim()),
        ));
    };
    let project_name = app
        .tracker
        .projects
        .get(&draft.project_id)
        .map(|project| project.name.as_str())
        .unwrap_or("Unknown project");
    let label = if app.tracker.timer.is_paused() {
        "Paused"
    } else {
        "Running"
    };
    Line::from(vec![
        Span::styled(
            format!("{project_name} > "),
            Style::default()
                .fg(Theme::text())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "{label} {}",
                format_clock(app.tracker.timer.elapsed_seconds())
            ),
            Style::default()
                .fg(Theme::active())
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn keybinds_lines(app: &App) -> Vec<Line<'static>> {
    let primary = match app.view {
        AppView::Timer => "space: Start/Stop  p: Pause/Resume  x: Reset  Up/Down: Project",
        AppView::Projects => "Up/Down: Select  n: New project  d: Delete  space: Start/Stop",
        AppView::Reports => "Shift+Tab: Period  c: Client filter",
        AppView::Sessions => "C: Clear all sessions",
        AppView::Help => "Press ? to close this help screen",
    };
    vec![
        Line::from(Span::styled(primary, Style::default().fg(Theme::dim()))),
        Line::from(Span::styled(
            "Tab/1-5: Switch view  ?: Help  q: Quit",
            Style::default().fg(Theme::dim()),
        )),
    ]
}

fn render_new_project_popup(frame: &mut Frame, popup: &NewProjectPopup) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let field_line = |label: &'static str, value: &str, field: ProjectField| {
        let focused = popup.field == field;
        let value_style = if focused {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::text())
        };
        Line::from(vec![
            Span::styled(
                if focused { "> " } else { "  " },
                Style::default().fg(Theme::selection_marker()),
            ),
            Span::styled(label, Style::default().fg(Theme::dim())),
            Span::styled(value.to_string(), value_style),
            Span::styled(
                if focused { "_" } else { "" },
                Style::default().fg(Theme::highlight()),
            ),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(
            "New project",
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field_line("Name:   ", &popup.name, ProjectField::Name),
        field_line("Client: ", &popup.client, ProjectField::Client),
        field_line("Rate:   ", &popup.rate, ProjectField::Rate),
        field_line("Color:  ", &popup.color, ProjectField::Color),
        Line::from(""),
        Line::from(Span::styled(
            "Tab: next field. Leave color empty for a random one.",
            Style::default().fg(Theme::dim()),
        )),
        Line::from(Span::styled(
            "Enter: save. Esc: cancel.",
            Style::default().fg(Theme::dim()),
        )),
    ];

    let popup = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(bordered().title(" Project "));
    frame.render_widget(popup, area);
}

fn render_confirm_popup(frame: &mut Frame, popup: &ConfirmPopup) {
    let area = centered_rect(80, 30, frame.area());
    frame.render_widget(Clear, area);

    let key = |label: &'static str| {
        Span::styled(
            label,
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD),
        )
    };
    let lines = vec![
        Line::from(Span::styled(
            "Confirm Action",
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            popup.message.as_str(),
            Style::default().fg(Theme::text()),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Theme::dim())),
            key("Y"),
            Span::styled(" to confirm or ", Style::default().fg(Theme::dim())),
            key("N"),
            Span::styled("/", Style::default().fg(Theme::dim())),
            key("ESC"),
            Span::styled(" to cancel", Style::default().fg(Theme::dim())),
        ]),
    ];

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(bordered().title(" Confirm "));
    frame.render_widget(popup_widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::report::ReportOptions;
    use crate::storage::{self, KeyValueStore};
    use crate::store::Tracker;
    use crate::types::ProjectDraft;

    fn app() -> App {
        let kv: Rc<dyn KeyValueStore> = Rc::new(storage::open_in_memory().unwrap());
        let clock = Rc::new(ManualClock::at(2026, 3, 11, 9, 0));
        let mut tracker = Tracker::new(kv, clock, ReportOptions::default());
        tracker
            .projects
            .add(ProjectDraft {
                name: "Website".to_string(),
                client: "Acme".to_string(),
                hourly_rate: 75.0,
                color: Some("#336699".to_string()),
            })
            .unwrap();
        App::new(tracker, Config::default())
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn every_view_renders() {
        let mut app = app();
        for view in TABS {
            app.view = view;
            let screen = render(&app);
            assert!(screen.contains("Billable"));
            assert!(screen.contains(view.title()));
        }
    }

    #[test]
    fn timer_view_shows_selected_project() {
        let app = app();
        let screen = render(&app);
        assert!(screen.contains("Website"));
        assert!(screen.contains("00:00:00"));
    }

    #[test]
    fn sessions_and_reports_show_statistics() {
        let kv: Rc<dyn KeyValueStore> = Rc::new(storage::open_in_memory().unwrap());
        let clock = Rc::new(ManualClock::at(2026, 3, 11, 9, 0));
        let mut tracker = Tracker::new(kv, clock.clone(), ReportOptions::default());
        tracker
            .projects
            .add(ProjectDraft {
                name: "Website".to_string(),
                client: "Acme".to_string(),
                hourly_rate: 75.0,
                color: None,
            })
            .unwrap();
        for minutes in [20, 40] {
            tracker.start_timer(None).unwrap();
            clock.advance(minutes * 60);
            tracker.stop_timer();
        }
        let mut app = App::new(tracker, Config::default());

        app.view = AppView::Sessions;
        let screen = render(&app);
        assert!(screen.contains("Projects 1   Sessions 2   Days active 1"));

        app.view = AppView::Reports;
        let screen = render(&app);
        assert!(screen.contains("Avg"));
        assert!(screen.contains("0h 30m"));
    }

    #[test]
    fn popups_render_over_body() {
        let mut app = app();
        app.update(crate::app::AppEvent::KeyPress(crossterm::event::KeyCode::Char('n')));
        assert!(render(&app).contains("New project"));
        app.new_project_popup = None;
        app.update(crate::app::AppEvent::KeyPress(crossterm::event::KeyCode::Char('d')));
        assert!(render(&app).contains("Delete project 'Website'?"));
    }
}
