/// The two state containers and the context object that owns them.
mod projects;
mod timer;

use std::rc::Rc;

use tracing::info;

pub use projects::ProjectStore;
pub use timer::{TimerState, TimerStore};

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::report::{self, Report, ReportFilter, ReportOptions};
use crate::storage::KeyValueStore;
use crate::types::{Project, Session};

/// Built once at startup and handed to the CLI or the TUI.
pub struct Tracker {
    pub projects: ProjectStore,
    pub timer: TimerStore,
    pub report_options: ReportOptions,
}

impl Tracker {
    pub fn new(
        kv: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        report_options: ReportOptions,
    ) -> Self {
        let projects = ProjectStore::load(kv.clone(), clock.clone());
        let timer = TimerStore::load(kv, clock);
        let mut tracker = Self {
            projects,
            timer,
            report_options,
        };
        if let Some(draft) = tracker.timer.draft() {
            let project_id = draft.project_id.clone();
            if tracker.projects.select(&project_id).is_err() {
                info!(%project_id, "unfinished run belongs to a deleted project");
            }
        }
        tracker
    }

    /// Starts the timer for `project` (name or id), or for the selected project.
    pub fn start_timer(&mut self, project: Option<&str>) -> Result<bool, ValidationError> {
        let project_id = match project {
            Some(reference) => self.projects.find(reference)?.id.clone(),
            None => self
                .projects
                .selected()
                .ok_or(ValidationError::NoProjectSelected)?
                .id
                .clone(),
        };
        if self.timer.draft().is_none() {
            self.projects.select(&project_id)?;
        }
        self.timer.start(&project_id)
    }

    pub fn stop_timer(&mut self) -> Option<Session> {
        self.timer.stop()
    }

    /// The project of the unfinished run, if it still exists.
    pub fn active_project(&self) -> Option<&Project> {
        self.timer
            .draft()
            .and_then(|draft| self.projects.get(&draft.project_id))
    }

    pub fn report(&self, filter: &ReportFilter) -> Report {
        report::build_report(
            self.projects.projects(),
            self.timer.sessions(),
            filter,
            self.report_options,
            self.timer.now(),
        )
    }

    /// Seconds tracked today including the live run.
    pub fn today_seconds(&self) -> i64 {
        let live = if self.timer.draft().is_some() {
            self.timer.elapsed_seconds()
        } else {
            0
        };
        report::today_seconds(self.timer.sessions(), live, self.timer.now())
    }

    /// Irreversibly wipes projects, clients, sessions and the run state.
    pub fn clear_all_data(&mut self) {
        self.timer.clear_all_sessions();
        self.projects.clear_all();
    }
}
