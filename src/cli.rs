/// CLI argument parsing and command handling.
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::export::{self, ExportFormat};
use crate::format::{format_clock, format_hours_minutes, format_money, format_rate};
use crate::report::{Period, Report, ReportFilter};
use crate::store::{TimerState, Tracker};
use crate::types::{ProjectDraft, ProjectPatch};

#[derive(Parser)]
#[command(
    name = "billable",
    version,
    about = "Billable - A terminal time tracker for freelancers"
)]
pub struct Cli {
    /// Database file (overrides BILLABLE_DB).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Manage clients
    Client {
        #[command(subcommand)]
        command: ClientCommand,
    },
    /// Start the timer for a project (name or id)
    Start { project: String },
    /// Stop the timer and record a session
    Stop,
    Pause,
    Resume,
    /// Discard the running or paused timer without recording it
    Reset,
    Status,
    /// List recorded sessions, newest first
    Sessions {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Time and earnings summary
    Report {
        #[arg(short = 'p', long, value_enum, default_value_t = Period::Week)]
        period: Period,
        #[arg(short = 'c', long)]
        client: Option<String>,
    },
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Merge a JSON export into the current data
    Import { file: PathBuf },
    /// Delete all data, or only the session history
    Clear {
        #[arg(long)]
        sessions_only: bool,
        #[arg(long)]
        yes: bool,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    Add {
        name: String,
        #[arg(short = 'c', long)]
        client: String,
        #[arg(short = 'r', long)]
        rate: f64,
        #[arg(long)]
        color: Option<String>,
    },
    List,
    Update {
        project: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        client: Option<String>,
        #[arg(short = 'r', long)]
        rate: Option<f64>,
        #[arg(long)]
        color: Option<String>,
    },
    Delete { project: String },
    /// Delete every project and client
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
    List,
    /// Rename or recolor a client; a rename carries over to its projects
    Update {
        client: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Set { key: String, value: String },
}

/// Execute a CLI command against the loaded tracker.
pub fn run(command: Command, tracker: &mut Tracker, config: &mut Config) -> Result<()> {
    match command {
        Command::Project { command } => handle_project(command, tracker, config)?,
        Command::Client { command } => handle_client(command, tracker),
        Command::Start { project } => handle_start(&project, tracker),
        Command::Stop => handle_stop(tracker, config),
        Command::Pause => {
            if tracker.timer.pause() {
                println!("Paused at {}", format_clock(tracker.timer.elapsed_seconds()));
            } else {
                println!("Timer is not running.");
            }
        }
        Command::Resume => {
            if tracker.timer.resume() {
                println!("Resumed at {}", format_clock(tracker.timer.elapsed_seconds()));
            } else {
                println!("Timer is not paused.");
            }
        }
        Command::Reset => {
            if tracker.timer.reset() {
                println!("Timer reset, nothing was recorded.");
            } else {
                println!("Timer is not running.");
            }
        }
        Command::Status => print!("{}", render_status(tracker, config)),
        Command::Sessions { limit } => print!("{}", render_sessions(tracker, limit, config)),
        Command::Report { period, client } => {
            let report = tracker.report(&ReportFilter { period, client });
            print!("{}", render_report(&report, config));
        }
        Command::Export { format, output } => export::export(tracker, format, output.as_deref())?,
        Command::Import { file } => {
            let summary = export::import_file(tracker, &file)?;
            println!(
                "Imported {} project(s), {} client(s), {} session(s).",
                summary.projects, summary.clients, summary.sessions
            );
        }
        Command::Clear { sessions_only, yes } => {
            if !yes {
                println!("This cannot be undone. Re-run with --yes to confirm.");
            } else if sessions_only {
                tracker.timer.clear_all_sessions();
                println!("Session history cleared.");
            } else {
                tracker.clear_all_data();
                println!("All data cleared.");
            }
        }
        Command::Config { command } => handle_config(command, config)?,
    }
    Ok(())
}

fn handle_project(command: ProjectCommand, tracker: &mut Tracker, config: &Config) -> Result<()> {
    match command {
        ProjectCommand::Add {
            name,
            client,
            rate,
            color,
        } => {
            let draft = ProjectDraft {
                name,
                client,
                hourly_rate: rate,
                color,
            };
            match tracker.projects.add(draft) {
                Ok(project) => println!("Added project '{}' ({}).", project.name, project.id),
                Err(err) => println!("{err}"),
            }
        }
        ProjectCommand::List => {
            if tracker.projects.projects().is_empty() {
                println!("No projects yet. Add one with `billable project add`.");
            }
            for project in tracker.projects.projects() {
                println!(
                    "{}  {}  {}  {}  {}",
                    project.id,
                    project.name,
                    project.client,
                    format_rate(project.hourly_rate, &config.currency),
                    project.color
                );
            }
        }
        ProjectCommand::Update {
            project,
            name,
            client,
            rate,
            color,
        } => {
            let patch = ProjectPatch {
                name,
                client,
                hourly_rate: rate,
                color,
            };
            if patch.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }
            let id = match tracker.projects.find(&project) {
                Ok(found) => found.id.clone(),
                Err(err) => {
                    println!("{err}");
                    return Ok(());
                }
            };
            match tracker.projects.update(&id, patch) {
                Ok(_) => println!("Updated project '{project}'."),
                Err(err) => println!("{err}"),
            }
        }
        ProjectCommand::Delete { project } => {
            let id = match tracker.projects.find(&project) {
                Ok(found) => found.id.clone(),
                Err(err) => {
                    println!("{err}");
                    return Ok(());
                }
            };
            if let Some(removed) = tracker.projects.delete(&id) {
                println!(
                    "Deleted project '{}'. Its sessions are kept in the history.",
                    removed.name
                );
            }
        }
        ProjectCommand::Clear { yes } => {
            if yes {
                tracker.projects.clear_all();
                println!("All projects and clients deleted.");
            } else {
                println!("This cannot be undone. Re-run with --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_client(command: ClientCommand, tracker: &mut Tracker) {
    match command {
        ClientCommand::Add { name, color } => {
            match tracker.projects.add_client(&name, color.as_deref()) {
                Ok(client) => println!("Added client '{}'.", client.name),
                Err(err) => println!("{err}"),
            }
        }
        ClientCommand::List => {
            let names = tracker.projects.client_names();
            if names.is_empty() {
                println!("No clients yet.");
            }
            for name in names {
                let projects = tracker.projects.projects_by_client(&name).len();
                println!("{name}  ({projects} project(s))");
            }
        }
        ClientCommand::Update {
            client,
            name,
            color,
        } => {
            let Some(id) = tracker.projects.find_client(&client).map(|found| found.id.clone())
            else {
                println!("Client '{client}' not found");
                return;
            };
            match tracker
                .projects
                .update_client(&id, name.as_deref(), color.as_deref())
            {
                Ok(_) => println!("Updated client '{client}'."),
                Err(err) => println!("{err}"),
            }
        }
        ClientCommand::Delete { name } => {
            let Some(id) = tracker.projects.find_client(&name).map(|client| client.id.clone())
            else {
                println!("Client '{name}' not found");
                return;
            };
            tracker.projects.delete_client(&id);
            println!("Deleted client '{name}'.");
        }
    }
}

fn handle_start(project: &str, tracker: &mut Tracker) {
    match tracker.start_timer(Some(project)) {
        Ok(true) => {
            let name = tracker
                .active_project()
                .map(|project| project.name.as_str())
                .unwrap_or(project);
            println!("Started timer for '{name}'.");
        }
        Ok(false) => println!(
            "A timer is already {} for '{}'.",
            tracker.timer.state().label(),
            active_name(tracker)
        ),
        Err(err) => println!("{err}"),
    }
}

fn handle_stop(tracker: &mut Tracker, config: &Config) {
    if tracker.timer.is_paused() {
        println!("Timer is paused. Resume or reset it first.");
        return;
    }
    let Some(session) = tracker.stop_timer() else {
        println!("Timer is not running.");
        return;
    };
    let (name, rate) = match tracker.projects.get(&session.project_id) {
        Some(project) => (project.name.clone(), project.hourly_rate),
        None => ("Unknown project".to_string(), 0.0),
    };
    println!(
        "Recorded {} on '{}' ({}).",
        format_clock(session.duration),
        name,
        format_money(crate::report::earnings(session.duration, rate), &config.currency)
    );
}

fn handle_config(command: ConfigCommand, config: &mut Config) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if let Some(path) = config::config_path() {
                println!("# {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            let path = config::write_config(config)?;
            println!("Saved {key} to {}", path.display());
        }
    }
    Ok(())
}

fn active_name(tracker: &Tracker) -> String {
    tracker
        .active_project()
        .map(|project| project.name.clone())
        .unwrap_or_else(|| "Unknown project".to_string())
}

pub fn render_status(tracker: &mut Tracker, config: &Config) -> String {
    let elapsed = tracker.timer.refresh_elapsed();
    let mut out = String::new();
    match tracker.timer.state() {
        TimerState::Idle => {
            let _ = writeln!(out, "Timer: idle");
        }
        state => {
            let _ = writeln!(
                out,
                "Timer: {} on '{}'  {}",
                state.label(),
                active_name(tracker),
                format_clock(elapsed)
            );
        }
    }
    if let Some(project) = tracker.projects.selected() {
        let _ = writeln!(
            out,
            "Selected: {} ({}, {})",
            project.name,
            project.client,
            format_rate(project.hourly_rate, &config.currency)
        );
    }
    let _ = writeln!(out, "Today: {}", format_hours_minutes(tracker.today_seconds()));
    let sessions = tracker.timer.sessions();
    let _ = writeln!(
        out,
        "Data: {} project(s), {} session(s), {} day(s) active",
        tracker.projects.projects().len(),
        sessions.len(),
        crate::report::days_active(sessions)
    );
    out
}

pub fn render_sessions(tracker: &Tracker, limit: usize, config: &Config) -> String {
    let sessions = tracker.timer.recent_sessions(limit);
    if sessions.is_empty() {
        return "No sessions recorded.\n".to_string();
    }
    let mut out = String::new();
    for session in sessions {
        let (name, rate) = match tracker.projects.get(&session.project_id) {
            Some(project) => (project.name.as_str(), project.hourly_rate),
            None => ("Unknown project", 0.0),
        };
        let _ = writeln!(
            out,
            "{}  {}-{}  {:<20}  {}  {}",
            session.start_time.format("%Y-%m-%d"),
            session.start_time.format("%H:%M"),
            session.end_time.format("%H:%M"),
            name,
            format_clock(session.duration),
            format_money(crate::report::earnings(session.duration, rate), &config.currency)
        );
    }
    out
}

pub fn render_report(report: &Report, config: &Config) -> String {
    let mut out = String::new();
    let mut scope = report.filter.period.label().to_string();
    if let Some(start) = report.window_start {
        scope.push_str(&format!(" (since {})", start.format("%Y-%m-%d")));
    }
    if let Some(client) = &report.filter.client {
        scope.push_str(&format!(" - {client}"));
    }
    let _ = writeln!(out, "{scope}");
    if report.is_empty() {
        let _ = writeln!(out, "No sessions in this period.");
        return out;
    }
    let _ = writeln!(
        out,
        "Total: {}  {}  {} session(s)",
        format_hours_minutes(report.total_seconds),
        format_money(report.total_earnings, &config.currency),
        report.session_count
    );
    if let Some(rate) = report.average_rate() {
        let _ = writeln!(out, "Average rate: {}", format_rate(rate, &config.currency));
    }
    let _ = writeln!(out, "\nBy project:");
    for summary in &report.by_project {
        let _ = writeln!(
            out,
            "  {:<24} {:>8}  {:>10}  {} session(s), avg {}",
            summary.name(),
            format_hours_minutes(summary.total_seconds),
            format_money(summary.earnings, &config.currency),
            summary.session_count,
            format_hours_minutes(summary.average_session_seconds())
        );
    }
    let _ = writeln!(out, "\nBy client:");
    for summary in &report.by_client {
        let _ = writeln!(
            out,
            "  {:<24} {:>8}  {:>10}  {} project(s)",
            summary.client,
            format_hours_minutes(summary.total_seconds),
            format_money(summary.earnings, &config.currency),
            summary.project_count()
        );
    }
    out
}
