/// Project registry and client list.
use std::rc::Rc;

use tracing::info;

use crate::clock::Clock;
use crate::color;
use crate::error::ValidationError;
use crate::report::client_key;
use crate::storage::{self, CLIENTS_KEY, KeyValueStore, PROJECTS_KEY};
use crate::types::{Client, Project, ProjectDraft, ProjectId, ProjectPatch, new_id};

pub struct ProjectStore {
    kv: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    projects: Vec<Project>,
    clients: Vec<Client>,
    selected: Option<ProjectId>,
}

impl ProjectStore {
    /// Restores projects and clients from storage. Missing or rejected blobs start empty.
    pub fn load(kv: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let projects: Vec<Project> = storage::load(kv.as_ref(), PROJECTS_KEY).unwrap_or_default();
        let clients: Vec<Client> = storage::load(kv.as_ref(), CLIENTS_KEY).unwrap_or_default();
        info!(
            projects = projects.len(),
            clients = clients.len(),
            "loaded project store"
        );
        Self {
            kv,
            clock,
            projects,
            clients,
            selected: None,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// Resolves a user reference: exact id first, then a case-insensitive name.
    pub fn find(&self, name_or_id: &str) -> Result<&Project, ValidationError> {
        if let Some(project) = self.get(name_or_id) {
            return Ok(project);
        }
        let needle = name_or_id.trim();
        let mut matches = self
            .projects
            .iter()
            .filter(|project| project.name.eq_ignore_ascii_case(needle));
        match (matches.next(), matches.next()) {
            (Some(project), None) => Ok(project),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousProject(needle.to_string())),
            _ => Err(ValidationError::UnknownProject(needle.to_string())),
        }
    }

    pub fn add(&mut self, draft: ProjectDraft) -> Result<&Project, ValidationError> {
        let name = required(&draft.name, ValidationError::EmptyName)?;
        let client = required(&draft.client, ValidationError::EmptyClient)?;
        validate_rate(draft.hourly_rate)?;
        let color = color::color_or_random(draft.color.as_deref())?;

        let project = Project {
            id: new_id(),
            name,
            client,
            hourly_rate: draft.hourly_rate,
            color,
            created_at: self.clock.now(),
        };
        info!(id = %project.id, name = %project.name, "project added");
        self.projects.push(project);
        self.persist_projects();
        let index = self.projects.len() - 1;
        Ok(&self.projects[index])
    }

    /// Merges `patch` into the project with `id`. Returns `false` when no such project exists.
    pub fn update(&mut self, id: &str, patch: ProjectPatch) -> Result<bool, ValidationError> {
        let name = patch
            .name
            .as_deref()
            .map(|name| required(name, ValidationError::EmptyName))
            .transpose()?;
        let client = patch
            .client
            .as_deref()
            .map(|client| required(client, ValidationError::EmptyClient))
            .transpose()?;
        if let Some(rate) = patch.hourly_rate {
            validate_rate(rate)?;
        }
        let color = patch.color.as_deref().map(color::normalize_hex).transpose()?;

        let Some(project) = self.projects.iter_mut().find(|project| project.id == id) else {
            return Ok(false);
        };
        if let Some(name) = name {
            project.name = name;
        }
        if let Some(client) = client {
            project.client = client;
        }
        if let Some(rate) = patch.hourly_rate {
            project.hourly_rate = rate;
        }
        if let Some(color) = color {
            project.color = color;
        }
        info!(id, "project updated");
        self.persist_projects();
        Ok(true)
    }

    /// Removes the project. Sessions that reference it are left alone.
    pub fn delete(&mut self, id: &str) -> Option<Project> {
        let index = self.projects.iter().position(|project| project.id == id)?;
        let removed = self.projects.remove(index);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        info!(id, name = %removed.name, "project deleted");
        self.persist_projects();
        Some(removed)
    }

    pub fn clear_all(&mut self) {
        self.projects.clear();
        self.clients.clear();
        self.selected = None;
        storage::remove(self.kv.as_ref(), PROJECTS_KEY);
        storage::remove(self.kv.as_ref(), CLIENTS_KEY);
        info!("all projects and clients cleared");
    }

    pub fn select(&mut self, id: &str) -> Result<(), ValidationError> {
        if self.get(id).is_none() {
            return Err(ValidationError::UnknownProject(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// The explicitly selected project, or the first one when nothing was chosen.
    pub fn selected(&self) -> Option<&Project> {
        self.selected
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.projects.first())
    }

    pub fn projects_by_client(&self, client: &str) -> Vec<&Project> {
        let key = client_key(client);
        self.projects
            .iter()
            .filter(|project| client_key(&project.client) == key)
            .collect()
    }

    /// Client names known from the registry and from projects, sorted and deduplicated.
    pub fn client_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .clients
            .iter()
            .map(|client| client.name.clone())
            .chain(self.projects.iter().map(|project| project.client.clone()))
            .collect();
        names.sort_by_key(|name| client_key(name));
        names.dedup_by(|a, b| client_key(a) == client_key(b));
        names
    }

    pub fn find_client(&self, name: &str) -> Option<&Client> {
        let key = client_key(name);
        self.clients
            .iter()
            .find(|client| client_key(&client.name) == key)
    }

    pub fn add_client(&mut self, name: &str, color: Option<&str>) -> Result<&Client, ValidationError> {
        let name = required(name, ValidationError::EmptyName)?;
        if self.find_client(&name).is_some() {
            return Err(ValidationError::DuplicateClient(name));
        }
        let client = Client {
            id: new_id(),
            name,
            color: color::color_or_random(color)?,
        };
        info!(id = %client.id, name = %client.name, "client added");
        self.clients.push(client);
        self.persist_clients();
        let index = self.clients.len() - 1;
        Ok(&self.clients[index])
    }

    /// Renames or recolors a client. A rename is carried over to its projects.
    pub fn update_client(
        &mut self,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<bool, ValidationError> {
        let name = name
            .map(|name| required(name, ValidationError::EmptyName))
            .transpose()?;
        let color = color.map(color::normalize_hex).transpose()?;
        if let Some(name) = &name {
            let key = client_key(name);
            if self
                .clients
                .iter()
                .any(|client| client.id != id && client_key(&client.name) == key)
            {
                return Err(ValidationError::DuplicateClient(name.clone()));
            }
        }

        let Some(client) = self.clients.iter_mut().find(|client| client.id == id) else {
            return Ok(false);
        };
        let mut projects_changed = false;
        if let Some(name) = name {
            let old_key = client_key(&client.name);
            for project in &mut self.projects {
                if client_key(&project.client) == old_key {
                    project.client = name.clone();
                    projects_changed = true;
                }
            }
            client.name = name;
        }
        if let Some(color) = color {
            client.color = color;
        }
        self.persist_clients();
        if projects_changed {
            self.persist_projects();
        }
        Ok(true)
    }

    /// Removes the client from the registry; projects keep their client name.
    pub fn delete_client(&mut self, id: &str) -> Option<Client> {
        let index = self.clients.iter().position(|client| client.id == id)?;
        let removed = self.clients.remove(index);
        info!(id, name = %removed.name, "client deleted");
        self.persist_clients();
        Some(removed)
    }

    /// Appends projects whose ids are not known yet. Returns how many were added.
    pub fn merge_projects(&mut self, incoming: Vec<Project>) -> usize {
        let before = self.projects.len();
        for project in incoming {
            if self.get(&project.id).is_none() {
                self.projects.push(project);
            }
        }
        let added = self.projects.len() - before;
        if added > 0 {
            self.persist_projects();
        }
        added
    }

    pub fn merge_clients(&mut self, incoming: Vec<Client>) -> usize {
        let before = self.clients.len();
        for client in incoming {
            if !self.clients.iter().any(|known| known.id == client.id) {
                self.clients.push(client);
            }
        }
        let added = self.clients.len() - before;
        if added > 0 {
            self.persist_clients();
        }
        added
    }

    fn persist_projects(&self) {
        storage::save(self.kv.as_ref(), PROJECTS_KEY, &self.projects);
    }

    fn persist_clients(&self) {
        storage::save(self.kv.as_ref(), CLIENTS_KEY, &self.clients);
    }
}

fn required(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}

fn validate_rate(rate: f64) -> Result<(), ValidationError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidRate(rate))
    }
}
