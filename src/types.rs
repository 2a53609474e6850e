use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub type ProjectId = String;
pub type ClientId = String;
pub type SessionId = String;

/// Generates a fresh opaque identifier for any record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: String,
    pub hourly_rate: f64,
    pub color: String,
    pub created_at: DateTime<Local>,
}

/// User input for a new project; identity and creation time are assigned by the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub client: String,
    pub hourly_rate: f64,
    pub color: Option<String>,
}

/// Partial update merged into an existing project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub client: Option<String>,
    pub hourly_rate: Option<f64>,
    pub color: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.client.is_none()
            && self.hourly_rate.is_none()
            && self.color.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub color: String,
}

/// A finished, immutable stretch of work against a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub project_id: ProjectId,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    /// Billed seconds. Less than `end_time - start_time` when the run was paused.
    pub duration: i64,
}

impl Session {
    pub fn hours(&self) -> f64 {
        self.duration as f64 / 3600.0
    }
}

/// The in-progress session while the timer is running or paused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSession {
    pub id: SessionId,
    pub project_id: ProjectId,
    pub start_time: DateTime<Local>,
    /// Seconds banked by run segments that ended in a pause.
    pub accumulated_seconds: i64,
}
