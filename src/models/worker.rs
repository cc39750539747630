//! Worker registry models.

use serde::{Deserialize, Serialize};

use crate::names::{NameIndex, normalize};
use crate::time::parse_date;

/// Role label used when a worker has no role on record.
pub const UNSPECIFIED_ROLE: &str = "Не указано";

/// Current employment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentState {
    #[default]
    Active,
    Vacation,
    Sick,
    Fired,
}

/// Employment state with an optional `DD.MM.YYYY` range for temporary states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    #[serde(rename = "type", default)]
    pub state: EmploymentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl WorkerStatus {
    /// Only dismissal is permanent.
    pub fn permanent(&self) -> bool {
        self.state == EmploymentState::Fired
    }

    /// Whether the worker can be placed on a shift on `date`.
    ///
    /// Temporary states block inside their range; a missing bound leaves that
    /// side open. Dates that don't parse are treated as inside the range.
    pub fn is_available_on(&self, date: &str) -> bool {
        match self.state {
            EmploymentState::Active => true,
            EmploymentState::Fired => false,
            EmploymentState::Vacation | EmploymentState::Sick => {
                let Some(day) = parse_date(date) else {
                    return false;
                };
                let after_start = self.from.as_deref().and_then(parse_date).is_none_or(|from| day >= from);
                let before_end = self.to.as_deref().and_then(parse_date).is_none_or(|to| day <= to);
                !(after_start && before_end)
            }
        }
    }
}

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub competencies: Vec<String>,
    #[serde(default)]
    pub status: WorkerStatus,
    /// Line whose roster lists the worker; derived from the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_line: Option<String>,
}

impl Worker {
    pub fn new(name: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            name: name.into(),
            role: role.map(str::to_string),
            competencies: Vec::new(),
            status: WorkerStatus::default(),
            home_line: None,
        }
    }

    /// Role for display, falling back to "Не указано".
    pub fn display_role(&self) -> &str {
        self.role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(UNSPECIFIED_ROLE)
    }

    /// Whether the worker holds `role` as main role or competency.
    pub fn is_qualified_for(&self, role: &str) -> bool {
        let wanted = normalize(role);
        self.role.iter().chain(&self.competencies).any(|r| normalize(r) == wanted)
    }
}

/// The manually maintained worker registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Worker>", into = "Vec<Worker>")]
pub struct Registry {
    workers: Vec<Worker>,
    index: NameIndex<usize>,
}

impl From<Vec<Worker>> for Registry {
    fn from(workers: Vec<Worker>) -> Self {
        let mut registry = Self {
            workers,
            index: NameIndex::new(),
        };
        registry.reindex();
        registry
    }
}

impl From<Registry> for Vec<Worker> {
    fn from(registry: Registry) -> Self {
        registry.workers
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn reindex(&mut self) {
        self.index = self
            .workers
            .iter()
            .enumerate()
            .map(|(idx, w)| (w.name.clone(), idx))
            .collect();
    }

    /// Add a worker, replacing an entry with the same normalized name.
    pub fn upsert(&mut self, worker: Worker) {
        match self.index.get_exact(&worker.name).map(|(_, &idx)| idx) {
            Some(idx) => self.workers[idx] = worker,
            None => {
                self.index.insert(worker.name.clone(), self.workers.len());
                self.workers.push(worker);
            }
        }
    }

    /// Remove the worker with exactly this (normalized) name.
    pub fn remove(&mut self, name: &str) -> Option<Worker> {
        let idx = *self.index.get_exact(name)?.1;
        let removed = self.workers.remove(idx);
        self.reindex();
        Some(removed)
    }

    /// Find a worker by exact key, then by fuzzy match within the surname.
    pub fn find(&self, name: &str) -> Option<&Worker> {
        self.index.find(name).map(|(_, &idx)| &self.workers[idx])
    }

    /// Role of the worker matching `name`, if any.
    pub fn role_of(&self, name: &str) -> Option<&str> {
        self.find(name).map(Worker::display_role)
    }

    /// Whether the worker matching `name` can work on `date`. Unknown names
    /// are assumed available.
    pub fn is_available_on(&self, name: &str, date: &str) -> bool {
        self.find(name).is_none_or(|w| w.status.is_available_on(date))
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn workers_mut(&mut self) -> &mut [Worker] {
        &mut self.workers
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
