//! Badge-system export scanning.
//!
//! The export is a loose report: page headers, date header rows that
//! redefine which column holds which date, and one row per employee with a
//! sequence number and a name. Rows are scanned top to bottom.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::builder::build_person_events;
use super::cell::{Cell, parse_cell};
use crate::error::{AppError, Result};
use crate::models::{AttendanceDataset, Registry};
use crate::names::normalize;
use crate::time::date_sort_key;

/// Cell value meaning "no attendance".
pub const DEFAULT_SKIP_VALUE: &str = "нет";

static DATE_CELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid date regex"));

const BOILERPLATE: &[&str] = &["отчет", "отчёт", "период с", "страница"];

/// Raw tokens of one employee keyed by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BadgePerson {
    pub name: String,
    pub cells: BTreeMap<String, Cell>,
}

/// Result of scanning a badge export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BadgeExport {
    /// Every date seen in a header row, in calendar order.
    pub dates: Vec<String>,
    pub people: Vec<BadgePerson>,
}

fn is_boilerplate(row: &[Cell]) -> bool {
    row.iter().take(5).any(|cell| {
        let text = cell.text().to_lowercase();
        BOILERPLATE.iter().any(|marker| text.contains(marker))
    })
}

/// Column → date mapping if the row is a date header.
fn date_header(row: &[Cell]) -> Option<Vec<(usize, String)>> {
    let columns: Vec<(usize, String)> = row
        .iter()
        .enumerate()
        .map(|(col, cell)| (col, cell.text()))
        .filter(|(_, text)| DATE_CELL.is_match(text))
        .collect();
    (!columns.is_empty()).then_some(columns)
}

fn is_sequence_number(cell: &Cell) -> bool {
    match cell {
        Cell::Number(n) => n.fract() == 0.0 && *n >= 0.0,
        Cell::Text(s) => {
            let s = s.trim();
            !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
        }
        Cell::Empty => false,
    }
}

/// Name of the employee if the row is an employee row.
fn employee_name(row: &[Cell]) -> Option<String> {
    if !row.iter().take(3).any(is_sequence_number) {
        return None;
    }
    row.iter().skip(1).take(5).find_map(|cell| match cell {
        Cell::Text(s) => {
            let s = s.trim();
            (s.chars().count() >= 3 && s.chars().any(char::is_alphabetic)).then(|| s.to_string())
        }
        _ => None,
    })
}

/// Scan a cell grid into per-employee, per-date raw tokens.
///
/// Fails only when no date header is found. For a given employee and
/// date the first non-empty value wins; values equal to `skip_value`
/// (case-insensitive) are ignored.
pub fn scan_badge_grid(grid: &[Vec<Cell>], skip_value: &str) -> Result<BadgeExport> {
    let mut columns: Vec<(usize, String)> = Vec::new();
    let mut all_dates: Vec<String> = Vec::new();
    let mut people: Vec<BadgePerson> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let skip_value = skip_value.to_lowercase();

    for (row_idx, row) in grid.iter().enumerate() {
        if is_boilerplate(row) {
            continue;
        }
        if let Some(header) = date_header(row) {
            for (_, date) in &header {
                if !all_dates.contains(date) {
                    all_dates.push(date.clone());
                }
            }
            columns = header;
            continue;
        }
        let Some(name) = employee_name(row) else {
            continue;
        };
        if columns.is_empty() {
            warn!("Row {}: employee {} before any date header, skipped", row_idx + 1, name);
            continue;
        }

        let key = normalize(&name);
        let idx = *by_key.entry(key).or_insert_with(|| {
            people.push(BadgePerson {
                name: name.clone(),
                cells: BTreeMap::new(),
            });
            people.len() - 1
        });
        let person = &mut people[idx];
        for (col, date) in &columns {
            let Some(cell) = row.get(*col) else {
                continue;
            };
            if cell.is_empty() || cell.text().to_lowercase() == skip_value {
                continue;
            }
            person.cells.entry(date.clone()).or_insert_with(|| cell.clone());
        }
    }

    if all_dates.is_empty() {
        return Err(AppError::parse("no dates found in badge export"));
    }
    all_dates.sort_by_key(|d| date_sort_key(d));
    info!("Badge export: {} dates, {} employees", all_dates.len(), people.len());

    Ok(BadgeExport {
        dates: all_dates,
        people,
    })
}

impl BadgeExport {
    /// Build attendance records for everyone in the export.
    ///
    /// Badge names that resolve to a registry worker are stored under the
    /// registry name; the badge spelling is kept as `raw_name`.
    pub fn into_dataset(&self, registry: &Registry) -> AttendanceDataset {
        let mut dataset = AttendanceDataset::new();
        for person in &self.people {
            let canonical = registry.find(&person.name).map_or(person.name.as_str(), |w| w.name.as_str());
            let cells: Vec<_> = person
                .cells
                .iter()
                .map(|(date, cell)| (date.clone(), parse_cell(cell)))
                .collect();
            for record in build_person_events(canonical, &person.name, &cells) {
                dataset.insert(record);
            }
        }
        dataset
    }
}
