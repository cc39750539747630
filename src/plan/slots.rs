//! Expansion of a plan snapshot into per-slot assignments.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use super::roster::split_roster;
use crate::models::{AssignmentKind, PlanSnapshot, PlannedAssignment, Registry, SlotStatus};
use crate::names::matches;

/// Build the id of one slot.
pub fn slot_id(date: &str, shift: &str, line: &str, role: &str, index: u32) -> String {
    format!("{date}|{shift}|{line}|{role}|{index}")
}

/// Text of a spreadsheet cell; whole numbers print without a fraction.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Whether a demand cell says the line runs.
fn demand_runs(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_some_and(|f| f > 0.0),
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            match s.replace(',', ".").parse::<f64>() {
                Ok(f) => f > 0.0,
                Err(_) => !s.is_empty() && !s.eq_ignore_ascii_case("нет"),
            }
        }
        _ => false,
    }
}

impl PlanSnapshot {
    /// (shift, line) pairs that run on `date`, in demand-table order.
    pub fn running_lines(&self, date: &str) -> Vec<(String, String)> {
        let Some((header, rows)) = self.raw_tables.demand.split_first() else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut running = Vec::new();
        for row in rows.iter().filter(|row| row.first().map(cell_text).as_deref() == Some(date)) {
            let shift = row.get(1).map(cell_text).unwrap_or_default();
            if shift.is_empty() {
                continue;
            }
            for (col, line) in header.iter().enumerate().skip(2) {
                let line = cell_text(line);
                if line.is_empty() || !self.line_templates.contains_key(&line) {
                    continue;
                }
                if row.get(col).is_some_and(demand_runs) && seen.insert((shift.clone(), line.clone())) {
                    running.push((shift.clone(), line));
                }
            }
        }
        running
    }

    /// Every slot planned on `date`, with manual overrides applied.
    ///
    /// Roster names fill slots in order; a worker the registry marks as
    /// unavailable on the date leaves their slot vacant.
    pub fn planned_for_date(&self, date: &str, registry: &Registry) -> Vec<PlannedAssignment> {
        let mut slots = Vec::new();
        for (shift, line) in self.running_lines(date) {
            let Some(positions) = self.line_templates.get(&line) else {
                continue;
            };
            for position in positions {
                let names = position.roster.get(&shift).map(|cell| split_roster(cell)).unwrap_or_default();
                let count = position.count.max(names.len() as u32);
                for index in 0..count {
                    let id = slot_id(date, &shift, &line, &position.role, index);
                    let rostered = names
                        .get(index as usize)
                        .filter(|name| registry.is_available_on(name, date))
                        .cloned();
                    let mut slot = PlannedAssignment {
                        status: if rostered.is_some() {
                            SlotStatus::Filled
                        } else {
                            SlotStatus::Vacancy
                        },
                        slot_id: id,
                        date: date.to_string(),
                        shift: shift.clone(),
                        line: line.clone(),
                        role: position.role.clone(),
                        index,
                        name: rostered,
                        kind: AssignmentKind::Home,
                    };
                    if let Some(manual) = self.manual_assignments.get(&slot.slot_id) {
                        slot.name = manual.name.clone().filter(|n| !n.trim().is_empty());
                        slot.status = if slot.name.is_some() {
                            manual.status
                        } else {
                            SlotStatus::Vacancy
                        };
                        slot.kind = manual.kind;
                    }
                    slots.push(slot);
                }
            }
        }
        debug!("Expanded {} slots for {}", slots.len(), date);
        slots
    }

    /// Dates covered by the snapshot: `scheduleDates`, else the demand rows.
    pub fn dates(&self) -> Vec<String> {
        if !self.schedule_dates.is_empty() {
            return self.schedule_dates.clone();
        }
        let mut seen = HashSet::new();
        self.raw_tables
            .demand
            .iter()
            .skip(1)
            .filter_map(|row| row.first().map(cell_text))
            .filter(|date| !date.is_empty() && seen.insert(date.clone()))
            .collect()
    }

    /// Slots for every date of the snapshot.
    pub fn all_planned(&self, registry: &Registry) -> Vec<PlannedAssignment> {
        self.dates()
            .iter()
            .flat_map(|date| self.planned_for_date(date, registry))
            .collect()
    }

    /// First line whose roster lists `name`.
    pub fn home_line(&self, name: &str) -> Option<&str> {
        self.line_templates
            .iter()
            .find(|(_, positions)| {
                positions
                    .iter()
                    .flat_map(|p| p.roster.values())
                    .flat_map(|cell| split_roster(cell))
                    .any(|rostered| matches(&rostered, name))
            })
            .map(|(line, _)| line.as_str())
    }
}

/// Fill in `home_line` for every registry worker.
pub fn assign_home_lines(registry: &mut Registry, snapshot: &PlanSnapshot) {
    for worker in registry.workers_mut() {
        worker.home_line = snapshot.home_line(&worker.name).map(str::to_string);
    }
}
