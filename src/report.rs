use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::{Project, ProjectId, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Week,
    Month,
    All,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::Week => "This Week",
            Period::Month => "This Month",
            Period::All => "All Time",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Period::Week => Period::Month,
            Period::Month => Period::All,
            Period::All => Period::Week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    #[default]
    Sunday,
}

/// What happens to sessions whose project was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrphanPolicy {
    /// Counted in time and session totals, never billed.
    #[default]
    ZeroRate,
    /// Dropped from every total.
    Exclude,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub period: Period,
    pub client: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub week_start: WeekStart,
    pub orphan_policy: OrphanPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    /// `None` for orphaned sessions.
    pub project: Option<Project>,
    pub total_seconds: i64,
    pub earnings: f64,
    pub session_count: usize,
}

impl ProjectSummary {
    pub fn name(&self) -> &str {
        self.project
            .as_ref()
            .map(|project| project.name.as_str())
            .unwrap_or("Unknown project")
    }

    /// Mean length of one session, in whole seconds.
    pub fn average_session_seconds(&self) -> i64 {
        match i64::try_from(self.session_count) {
            Ok(count) if count > 0 => self.total_seconds / count,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSummary {
    pub client: String,
    pub total_seconds: i64,
    pub earnings: f64,
    pub session_count: usize,
    pub projects: Vec<ProjectSummary>,
}

impl ClientSummary {
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub filter: ReportFilter,
    pub window_start: Option<DateTime<Local>>,
    pub total_seconds: i64,
    pub total_earnings: f64,
    pub session_count: usize,
    pub by_project: Vec<ProjectSummary>,
    pub by_client: Vec<ClientSummary>,
}

impl Report {
    pub fn total_hours(&self) -> f64 {
        self.total_seconds as f64 / 3600.0
    }

    /// Effective hourly rate over billed and unbilled time alike.
    pub fn average_rate(&self) -> Option<f64> {
        if self.total_seconds > 0 {
            Some(self.total_earnings / self.total_hours())
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.session_count == 0
    }
}

/// Case-folded form used wherever client names are compared or grouped.
pub fn client_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn earnings(seconds: i64, hourly_rate: f64) -> f64 {
    seconds as f64 / 3600.0 * hourly_rate
}

/// First instant counted by `period`, or `None` for all time.
pub fn window_start(
    period: Period,
    now: DateTime<Local>,
    week_start: WeekStart,
) -> Option<DateTime<Local>> {
    let today = now.date_naive();
    match period {
        Period::All => None,
        Period::Week => {
            let offset = match week_start {
                WeekStart::Monday => today.weekday().num_days_from_monday(),
                WeekStart::Sunday => today.weekday().num_days_from_sunday(),
            };
            Some(local_midnight(today - Duration::days(i64::from(offset))))
        }
        Period::Month => Some(local_midnight(today.with_day(1).unwrap_or(today))),
    }
}

/// Groups sessions by project and client and totals them.
pub fn build_report(
    projects: &[Project],
    sessions: &[Session],
    filter: &ReportFilter,
    options: ReportOptions,
    now: DateTime<Local>,
) -> Report {
    let window_start = window_start(filter.period, now, options.week_start);
    let client_filter = filter
        .client
        .as_deref()
        .map(client_key)
        .filter(|client| !client.is_empty());
    let by_id: HashMap<&str, &Project> = projects
        .iter()
        .map(|project| (project.id.as_str(), project))
        .collect();

    let mut grouped: HashMap<&str, ProjectSummary> = HashMap::new();
    for session in sessions {
        if window_start.is_some_and(|start| session.start_time < start) {
            continue;
        }
        let project = by_id.get(session.project_id.as_str()).copied();
        match (project, client_filter.as_deref()) {
            (None, _) if options.orphan_policy == OrphanPolicy::Exclude => continue,
            (None, Some(_)) => continue,
            (Some(project), Some(client)) if client_key(&project.client) != client => continue,
            _ => {}
        }
        let summary = grouped
            .entry(session.project_id.as_str())
            .or_insert_with(|| ProjectSummary {
                project_id: session.project_id.clone(),
                project: project.cloned(),
                total_seconds: 0,
                earnings: 0.0,
                session_count: 0,
            });
        summary.total_seconds += session.duration;
        summary.session_count += 1;
        if let Some(project) = project {
            summary.earnings += earnings(session.duration, project.hourly_rate);
        }
    }

    let mut by_project: Vec<ProjectSummary> = grouped.into_values().collect();
    by_project.sort_by(|a, b| {
        b.total_seconds
            .cmp(&a.total_seconds)
            .then_with(|| a.name().cmp(b.name()))
    });

    let by_client = group_by_client(&by_project);
    let total_seconds = by_project.iter().map(|summary| summary.total_seconds).sum();
    let total_earnings = by_project.iter().map(|summary| summary.earnings).sum();
    let session_count = by_project.iter().map(|summary| summary.session_count).sum();

    Report {
        filter: filter.clone(),
        window_start,
        total_seconds,
        total_earnings,
        session_count,
        by_project,
        by_client,
    }
}

fn group_by_client(by_project: &[ProjectSummary]) -> Vec<ClientSummary> {
    let mut grouped: HashMap<String, ClientSummary> = HashMap::new();
    for summary in by_project {
        let Some(project) = &summary.project else {
            continue;
        };
        let client = grouped
            .entry(client_key(&project.client))
            .or_insert_with(|| ClientSummary {
                client: project.client.clone(),
                total_seconds: 0,
                earnings: 0.0,
                session_count: 0,
                projects: Vec::new(),
            });
        client.total_seconds += summary.total_seconds;
        client.earnings += summary.earnings;
        client.session_count += summary.session_count;
        client.projects.push(summary.clone());
    }

    let mut by_client: Vec<ClientSummary> = grouped.into_values().collect();
    by_client.sort_by(|a, b| {
        b.total_seconds
            .cmp(&a.total_seconds)
            .then_with(|| a.client.cmp(&b.client))
    });
    by_client
}

/// Seconds of finished work that started today, plus the live draft if any.
pub fn today_seconds(sessions: &[Session], running_seconds: i64, now: DateTime<Local>) -> i64 {
    let today_start = local_midnight(now.date_naive());
    let finished: i64 = sessions
        .iter()
        .filter(|session| session.start_time >= today_start)
        .map(|session| session.duration)
        .sum();
    finished + running_seconds
}

/// Number of distinct local dates on which a session started.
pub fn days_active(sessions: &[Session]) -> usize {
    sessions
        .iter()
        .map(|session| session.start_time.date_naive())
        .collect::<HashSet<_>>()
        .len()
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let result = Local.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0);
    result
        .earliest()
        .or_else(|| result.latest())
        .unwrap_or_else(Local::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, day, hour, 0, 0)
            .earliest()
            .unwrap()
    }

    fn project(id: &str, name: &str, client: &str, rate: f64) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            client: client.to_string(),
            hourly_rate: rate,
            color: "#3B82F6".to_string(),
            created_at: at(1, 8),
        }
    }

    fn session(project_id: &str, start: DateTime<Local>, duration: i64) -> Session {
        Session {
            id: crate::types::new_id(),
            project_id: project_id.to_string(),
            start_time: start,
            end_time: start + Duration::seconds(duration),
            duration,
        }
    }

    fn all_time() -> ReportFilter {
        ReportFilter {
            period: Period::All,
            client: None,
        }
    }

    // 2026-03-11 is a Wednesday.
    fn now() -> DateTime<Local> {
        at(11, 12)
    }

    #[test]
    fn one_hour_at_75_earns_75() {
        let projects = vec![project("web", "Website", "Acme", 75.0)];
        let sessions = vec![session("web", at(10, 9), 3600)];
        let report = build_report(&projects, &sessions, &all_time(), ReportOptions::default(), now());
        assert_eq!(report.session_count, 1);
        assert_eq!(format!("{:.2}", report.total_earnings), "75.00");
    }

    #[test]
    fn two_half_hours_make_one_billed_hour() {
        let projects = vec![project("web", "Website", "Acme", 75.0)];
        let sessions = vec![
            session("web", at(10, 9), 1800),
            session("web", at(10, 14), 1800),
        ];
        let report = build_report(&projects, &sessions, &all_time(), ReportOptions::default(), now());
        let summary = &report.by_project[0];
        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.total_seconds, 3600);
        assert_eq!(format!("{:.2}", summary.earnings), "75.00");
        assert_eq!(report.total_hours(), 1.0);
        assert_eq!(report.average_rate(), Some(75.0));
    }

    #[test]
    fn per_project_totals_add_up_to_grand_totals() {
        let projects = vec![
            project("a", "Alpha", "Acme", 75.0),
            project("b", "Beta", "Acme", 100.0),
            project("c", "Gamma", "Globex", 33.3),
        ];
        let sessions = vec![
            session("a", at(2, 9), 1234),
            session("b", at(3, 9), 4321),
            session("c", at(4, 9), 999),
            session("a", at(5, 9), 7),
            session("gone", at(6, 9), 600),
        ];
        for orphan_policy in [OrphanPolicy::ZeroRate, OrphanPolicy::Exclude] {
            let options = ReportOptions {
                orphan_policy,
                ..Default::default()
            };
            let report = build_report(&projects, &sessions, &all_time(), options, now());
            let project_earnings: f64 = report.by_project.iter().map(|p| p.earnings).sum();
            let project_seconds: i64 = report.by_project.iter().map(|p| p.total_seconds).sum();
            assert!((project_earnings - report.total_earnings).abs() < 1e-9);
            assert_eq!(project_seconds, report.total_seconds);

            let direct: f64 = sessions
                .iter()
                .filter_map(|s| {
                    projects
                        .iter()
                        .find(|p| p.id == s.project_id)
                        .map(|p| earnings(s.duration, p.hourly_rate))
                })
                .sum();
            assert!((direct - report.total_earnings).abs() < 1e-9);

            let client_earnings: f64 = report.by_client.iter().map(|c| c.earnings).sum();
            assert!((client_earnings - report.total_earnings).abs() < 1e-9);
        }
    }

    #[test]
    fn orphans_count_as_unbilled_time_under_zero_rate() {
        let projects = vec![project("web", "Website", "Acme", 75.0)];
        let sessions = vec![session("web", at(10, 9), 3600), session("deleted", at(10, 11), 1800)];
        let report = build_report(&projects, &sessions, &all_time(), ReportOptions::default(), now());
        assert_eq!(report.session_count, 2);
        assert_eq!(report.total_seconds, 5400);
        assert_eq!(report.total_earnings, 75.0);
        let orphan = report
            .by_project
            .iter()
            .find(|summary| summary.project.is_none())
            .unwrap();
        assert_eq!(orphan.project_id, "deleted");
        assert_eq!(orphan.earnings, 0.0);
        assert_eq!(orphan.name(), "Unknown project");
        assert_eq!(report.by_client.len(), 1);
        assert_eq!(report.by_client[0].total_seconds, 3600);
        assert_eq!(report.average_rate(), Some(50.0));
    }

    #[test]
    fn orphans_disappear_under_exclude() {
        let projects = vec![project("web", "Website", "Acme", 75.0)];
        let sessions = vec![session("web", at(10, 9), 3600), session("deleted", at(10, 11), 1800)];
        let options = ReportOptions {
            orphan_policy: OrphanPolicy::Exclude,
            ..Default::default()
        };
        let report = build_report(&projects, &sessions, &all_time(), options, now());
        assert_eq!(report.session_count, 1);
        assert_eq!(report.total_seconds, 3600);
        assert!(report.by_project.iter().all(|summary| summary.project.is_some()));
    }

    #[test]
    fn only_orphans_still_produce_a_report() {
        let sessions = vec![session("deleted", at(10, 11), 1800)];
        let report = build_report(&[], &sessions, &all_time(), ReportOptions::default(), now());
        assert_eq!(report.total_earnings, 0.0);
        assert_eq!(report.session_count, 1);
        assert!(report.by_client.is_empty());
    }

    #[test]
    fn week_window_respects_week_start() {
        let projects = vec![project("web", "Website", "Acme", 60.0)];
        let sessions = vec![
            // Sunday 8th
            session("web", at(8, 10), 3600),
            // Monday 9th
            session("web", at(9, 10), 1800),
            // Previous Saturday
            session("web", at(7, 10), 600),
        ];
        let week = ReportFilter {
            period: Period::Week,
            client: None,
        };
        let sunday = build_report(&projects, &sessions, &week, ReportOptions::default(), now());
        assert_eq!(sunday.total_seconds, 5400);
        assert_eq!(sunday.window_start, Some(at(8, 0)));

        let monday_options = ReportOptions {
            week_start: WeekStart::Monday,
            ..Default::default()
        };
        let monday = build_report(&projects, &sessions, &week, monday_options, now());
        assert_eq!(monday.total_seconds, 1800);
    }

    #[test]
    fn month_window_starts_on_the_first() {
        let projects = vec![project("web", "Website", "Acme", 60.0)];
        let february = Local.with_ymd_and_hms(2026, 2, 28, 23, 0, 0).earliest().unwrap();
        let sessions = vec![session("web", february, 3600), session("web", at(1, 0), 60)];
        let month = ReportFilter {
            period: Period::Month,
            client: None,
        };
        let report = build_report(&projects, &sessions, &month, ReportOptions::default(), now());
        assert_eq!(report.total_seconds, 60);
        assert_eq!(report.window_start, Some(at(1, 0)));
    }

    #[test]
    fn client_filter_is_case_insensitive_and_drops_orphans() {
        let projects = vec![
            project("a", "Alpha", "Acme", 10.0),
            project("b", "Beta", "Globex", 10.0),
        ];
        let sessions = vec![
            session("a", at(10, 9), 3600),
            session("b", at(10, 10), 3600),
            session("gone", at(10, 11), 3600),
        ];
        let filter = ReportFilter {
            period: Period::All,
            client: Some(" acme ".to_string()),
        };
        let report = build_report(&projects, &sessions, &filter, ReportOptions::default(), now());
        assert_eq!(report.session_count, 1);
        assert_eq!(report.by_client.len(), 1);
        assert_eq!(report.by_client[0].client, "Acme");
    }

    #[test]
    fn groups_are_sorted_by_time() {
        let projects = vec![
            project("a", "Alpha", "Acme", 10.0),
            project("b", "Beta", "Acme", 10.0),
            project("c", "Gamma", "Globex", 10.0),
        ];
        let sessions = vec![
            session("a", at(10, 9), 100),
            session("b", at(10, 10), 300),
            session("c", at(10, 11), 200),
        ];
        let report = build_report(&projects, &sessions, &all_time(), ReportOptions::default(), now());
        let names: Vec<_> = report.by_project.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Beta", "Gamma", "Alpha"]);
        assert_eq!(report.by_client[0].client, "Acme");
        assert_eq!(report.by_client[0].project_count(), 2);
        assert_eq!(report.by_client[0].session_count, 2);
    }

    #[test]
    fn empty_report_has_no_average() {
        let report = build_report(&[], &[], &all_time(), ReportOptions::default(), now());
        assert!(report.is_empty());
        assert_eq!(report.average_rate(), None);
    }

    #[test]
    fn today_counts_finished_and_live_time() {
        let sessions = vec![session("a", at(11, 8), 600), session("a", at(10, 8), 600)];
        assert_eq!(today_seconds(&sessions, 30, now()), 630);
    }

    #[test]
    fn accented_client_names_group_and_filter_alike() {
        let projects = vec![
            project("a", "Alpha", "ÉCOLE", 10.0),
            project("b", "Beta", "école", 10.0),
        ];
        let sessions = vec![session("a", at(10, 9), 3600), session("b", at(10, 11), 3600)];
        let unfiltered = build_report(&projects, &sessions, &all_time(), ReportOptions::default(), now());
        assert_eq!(unfiltered.by_client.len(), 1);
        assert_eq!(unfiltered.by_client[0].total_seconds, 7200);

        let filter = ReportFilter {
            period: Period::All,
            client: Some("école".to_string()),
        };
        let filtered = build_report(&projects, &sessions, &filter, ReportOptions::default(), now());
        assert_eq!(filtered.total_seconds, unfiltered.by_client[0].total_seconds);
        assert_eq!(client_key(" ÉCOLE "), client_key("école"));
    }

    #[test]
    fn average_session_length_per_project() {
        let projects = vec![project("web", "Website", "Acme", 75.0)];
        let sessions = vec![session("web", at(10, 9), 1800), session("web", at(10, 14), 3600)];
        let report = build_report(&projects, &sessions, &all_time(), ReportOptions::default(), now());
        assert_eq!(report.by_project[0].average_session_seconds(), 2700);

        let empty = ProjectSummary {
            project_id: "web".to_string(),
            project: None,
            total_seconds: 0,
            earnings: 0.0,
            session_count: 0,
        };
        assert_eq!(empty.average_session_seconds(), 0);
    }

    #[test]
    fn days_active_counts_distinct_start_dates() {
        assert_eq!(days_active(&[]), 0);
        let sessions = vec![
            session("a", at(10, 9), 600),
            session("a", at(10, 15), 600),
            session("b", at(11, 8), 600),
        ];
        assert_eq!(days_active(&sessions[..2]), 1);
        assert_eq!(days_active(&sessions), 2);
    }

    #[test]
    fn period_cycles() {
        assert_eq!(Period::Week.next(), Period::Month);
        assert_eq!(Period::All.next(), Period::Week);
    }
}
