/// JSON and CSV export of everything the tracker stores, and JSON import.
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::report::{self, OrphanPolicy};
use crate::store::Tracker;
use crate::types::{Client, Project, Session};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    pub exported_at: DateTime<Local>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Records added by an import. Ids that already exist are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub projects: usize,
    pub clients: usize,
    pub sessions: usize,
}

impl ExportDocument {
    pub fn from_tracker(tracker: &Tracker) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: tracker.timer.now(),
            projects: tracker.projects.projects().to_vec(),
            clients: tracker.projects.clients().to_vec(),
            sessions: tracker.timer.sessions().to_vec(),
        }
    }
}

pub fn to_json(tracker: &Tracker) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from_tracker(tracker))?)
}

/// One row per session, oldest first.
pub fn to_csv(tracker: &Tracker) -> String {
    let mut out = String::from("id,date,project,client,start,end,duration_seconds,hours,earnings\n");
    let mut sessions: Vec<&Session> = tracker.timer.sessions().iter().collect();
    sessions.sort_by_key(|session| session.start_time);
    for session in sessions {
        let project = tracker.projects.get(&session.project_id);
        let (name, client, rate) = match project {
            Some(project) => (project.name.as_str(), project.client.as_str(), project.hourly_rate),
            None => ("", "", 0.0),
        };
        if project.is_none() && tracker.report_options.orphan_policy == OrphanPolicy::Exclude {
            continue;
        }
        let fields = [
            session.id.clone(),
            session.start_time.format("%Y-%m-%d").to_string(),
            name.to_string(),
            client.to_string(),
            session.start_time.to_rfc3339(),
            session.end_time.to_rfc3339(),
            session.duration.to_string(),
            format!("{:.2}", session.hours()),
            format!("{:.2}", report::earnings(session.duration, rate)),
        ];
        let row: Vec<String> = fields.iter().map(|field| csv_field(field)).collect();
        let _ = writeln!(out, "{}", row.join(","));
    }
    out
}

/// RFC 4180: quote when the field holds a comma, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes to `output`, or stdout when none is given.
pub fn export(tracker: &Tracker, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let body = match format {
        ExportFormat::Json => to_json(tracker)?,
        ExportFormat::Csv => to_csv(tracker),
    };
    match output {
        Some(path) => {
            fs::write(path, &body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), ?format, "exported data");
            println!("Exported to {}", path.display());
        }
        None => print!("{body}"),
    }
    Ok(())
}

pub fn parse_document(raw: &str) -> Result<ExportDocument> {
    let document: ExportDocument =
        serde_json::from_str(raw).context("file is not a billable export")?;
    if document.version != EXPORT_VERSION {
        bail!(
            "unsupported export version {} (expected {EXPORT_VERSION})",
            document.version
        );
    }
    Ok(document)
}

/// Merges a parsed export into the tracker by id.
pub fn import_document(tracker: &mut Tracker, document: ExportDocument) -> ImportSummary {
    let summary = ImportSummary {
        clients: tracker.projects.merge_clients(document.clients),
        projects: tracker.projects.merge_projects(document.projects),
        sessions: tracker.timer.merge_sessions(document.sessions),
    };
    info!(?summary, "imported data");
    summary
}

pub fn import_file(tracker: &mut Tracker, path: &Path) -> Result<ImportSummary> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = parse_document(&raw)?;
    Ok(import_document(tracker, document))
}
