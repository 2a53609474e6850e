use crossterm::event::KeyCode;

use crate::config::Config;
use crate::format::{format_clock, format_money};
use crate::report::{self, Period, Report, ReportFilter};
use crate::store::Tracker;
use crate::types::{ProjectDraft, ProjectId};

use super::{AppEvent, AppView, TABS};

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub tracker: Tracker,
    pub config: Config,
    pub view: AppView,
    pub status: Option<String>,
    pub period: Period,
    pub client_filter: Option<String>,
    pub new_project_popup: Option<NewProjectPopup>,
    pub confirm_popup: Option<ConfirmPopup>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Client,
    Rate,
    Color,
}

#[derive(Clone, Debug)]
pub struct NewProjectPopup {
    pub name: String,
    pub client: String,
    pub rate: String,
    pub color: String,
    pub field: ProjectField,
}

impl NewProjectPopup {
    fn new() -> Self {
        Self {
            name: String::new(),
            client: String::new(),
            rate: String::new(),
            color: String::new(),
            field: ProjectField::Name,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            ProjectField::Name => &mut self.name,
            ProjectField::Client => &mut self.client,
            ProjectField::Rate => &mut self.rate,
            ProjectField::Color => &mut self.color,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            ProjectField::Name => ProjectField::Client,
            ProjectField::Client => ProjectField::Rate,
            ProjectField::Rate => ProjectField::Color,
            ProjectField::Color => ProjectField::Name,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            ProjectField::Name => ProjectField::Color,
            ProjectField::Client => ProjectField::Name,
            ProjectField::Rate => ProjectField::Client,
            ProjectField::Color => ProjectField::Rate,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteProject(ProjectId),
    ClearSessions,
}

#[derive(Clone, Debug)]
pub struct ConfirmPopup {
    pub message: String,
    pub action: ConfirmAction,
}

impl App {
    pub fn new(tracker: Tracker, config: Config) -> Self {
        Self {
            running: true,
            tracker,
            config,
            view: AppView::Timer,
            status: None,
            period: Period::default(),
            client_filter: None,
            new_project_popup: None,
            confirm_popup: None,
        }
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            // Reads the current state, so a tick after stop or reset shows zero.
            AppEvent::Tick => {
                self.tracker.timer.refresh_elapsed();
            }
            AppEvent::KeyPress(key) => self.handle_key(key),
        }
    }

    pub fn report(&self) -> Report {
        self.tracker.report(&ReportFilter {
            period: self.period,
            client: self.client_filter.clone(),
        })
    }

    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.tracker.projects.selected()?;
        self.tracker
            .projects
            .projects()
            .iter()
            .position(|project| project.id == selected.id)
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.confirm_popup.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.new_project_popup.is_some() {
            self.handle_new_project_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => {
                self.view = if self.view == AppView::Help {
                    AppView::Timer
                } else {
                    AppView::Help
                };
            }
            KeyCode::Tab | KeyCode::Right => self.navigate_tab(1),
            KeyCode::Left => self.navigate_tab(TABS.len() - 1),
            KeyCode::Char(ch @ '1'..='5') => {
                let index = ch as usize - '1' as usize;
                self.view = TABS[index];
            }
            KeyCode::BackTab => {
                self.period = self.period.next();
                self.status = Some(format!("Report period: {}", self.period.label()));
            }
            KeyCode::Char('c') => self.cycle_client_filter(),
            KeyCode::Char(' ') => self.toggle_timer(),
            KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Char('x') => {
                if self.tracker.timer.reset() {
                    self.status = Some("Timer reset, nothing was recorded.".to_string());
                }
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('n') => {
                self.new_project_popup = Some(NewProjectPopup::new());
                self.clear_status();
            }
            KeyCode::Char('d') => self.open_delete_confirm(),
            KeyCode::Char('C') => {
                self.confirm_popup = Some(ConfirmPopup {
                    message: format!(
                        "Delete all {} recorded session(s)? This cannot be undone.",
                        self.tracker.timer.sessions().len()
                    ),
                    action: ConfirmAction::ClearSessions,
                });
            }
            KeyCode::Esc => self.clear_status(),
            _ => {}
        }
    }

    fn navigate_tab(&mut self, step: usize) {
        let index = TABS.iter().position(|view| *view == self.view).unwrap_or(0);
        self.view = TABS[(index + step) % TABS.len()];
    }

    fn move_selection(&mut self, delta: isize) {
        let projects = self.tracker.projects.projects();
        if projects.is_empty() {
            return;
        }
        let len = projects.len() as isize;
        let next = match self.selected_index() {
            Some(index) => (index as isize + delta).rem_euclid(len),
            None => 0,
        } as usize;
        let id = projects[next].id.clone();
        if let Err(err) = self.tracker.projects.select(&id) {
            self.status = Some(err.to_string());
        }
    }

    fn cycle_client_filter(&mut self) {
        let clients = self.tracker.projects.client_names();
        self.client_filter = match &self.client_filter {
            None => clients.first().cloned(),
            Some(current) => clients
                .iter()
                .position(|name| report::client_key(name) == report::client_key(current))
                .and_then(|index| clients.get(index + 1))
                .cloned(),
        };
        self.status = Some(match &self.client_filter {
            Some(client) => format!("Report client: {client}"),
            None => "Report client: all".to_string(),
        });
    }

    fn toggle_timer(&mut self) {
        if self.tracker.timer.is_paused() {
            self.status = Some("Timer is paused. Press p to resume or x to reset.".to_string());
            return;
        }
        if self.tracker.timer.is_running() {
            let Some(session) = self.tracker.stop_timer() else {
                return;
            };
            let (name, rate) = match self.tracker.projects.get(&session.project_id) {
                Some(project) => (project.name.clone(), project.hourly_rate),
                None => ("Unknown project".to_string(), 0.0),
            };
            self.status = Some(format!(
                "Recorded {} on {} ({}).",
                format_clock(session.duration),
                name,
                format_money(report::earnings(session.duration, rate), &self.config.currency)
            ));
            return;
        }
        match self.tracker.start_timer(None) {
            Ok(_) => {
                let name = self
                    .tracker
                    .active_project()
                    .map(|project| project.name.clone())
                    .unwrap_or_default();
                self.status = Some(format!("Timer started for {name}."));
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn toggle_pause(&mut self) {
        if self.tracker.timer.pause() {
            self.status = Some("Timer paused.".to_string());
        } else if self.tracker.timer.resume() {
            self.status = Some("Timer resumed.".to_string());
        } else {
            self.status = Some("Timer is not running.".to_string());
        }
    }

    fn open_delete_confirm(&mut self) {
        let Some(project) = self.tracker.projects.selected() else {
            self.status = Some("No project selected.".to_string());
            return;
        };
        self.confirm_popup = Some(ConfirmPopup {
            message: format!(
                "Delete project '{}'? Its sessions stay in the history.",
                project.name
            ),
            action: ConfirmAction::DeleteProject(project.id.clone()),
        });
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(popup) = self.confirm_popup.take() {
                    self.apply_confirm(popup.action);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_popup = None;
                self.clear_status();
            }
            _ => {}
        }
    }

    fn apply_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteProject(id) => {
                if let Some(removed) = self.tracker.projects.delete(&id) {
                    self.status = Some(format!("Deleted project '{}'.", removed.name));
                }
            }
            ConfirmAction::ClearSessions => {
                self.tracker.timer.clear_all_sessions();
                self.status = Some("Session history cleared.".to_string());
            }
        }
    }

    fn handle_new_project_key(&mut self, key: KeyCode) {
        let Some(popup) = self.new_project_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.new_project_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_new_project_popup(),
            KeyCode::Tab | KeyCode::Down => popup.next_field(),
            KeyCode::BackTab | KeyCode::Up => popup.prev_field(),
            KeyCode::Backspace | KeyCode::Delete => {
                popup.focused_mut().pop();
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                popup.focused_mut().push(ch);
            }
            _ => {}
        }
    }

    fn apply_new_project_popup(&mut self) {
        let Some(popup) = self.new_project_popup.take() else {
            return;
        };
        let rate_input = popup.rate.trim();
        let Ok(hourly_rate) = rate_input.parse::<f64>() else {
            self.status = Some("Please enter a valid hourly rate.".to_string());
            self.new_project_popup = Some(popup);
            return;
        };
        let draft = ProjectDraft {
            name: popup.name.clone(),
            client: popup.client.clone(),
            hourly_rate,
            color: Some(popup.color.clone()).filter(|color| !color.trim().is_empty()),
        };
        let id = match self.tracker.projects.add(draft) {
            Ok(project) => project.id.clone(),
            Err(err) => {
                self.status = Some(err.to_string());
                self.new_project_popup = Some(popup);
                return;
            }
        };
        if self.tracker.projects.select(&id).is_ok() {
            self.status = Some(format!("Project '{}' created.", popup.name.trim()));
        }
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
