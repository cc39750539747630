//! Strict parsing of badge-export cells into entry/exit times.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::time::{format_minutes, parse_to_minutes};

static CLOCK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}(?::\d{2})?").expect("valid clock token regex"));

static CLOCK_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d:\s\-–—]+$").expect("valid clock cell regex"));

const DASHES: &[char] = &['-', '–', '—'];

/// A spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Trimmed text of the cell; whole numbers print without a fraction.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Entry and exit times ("HH:MM") read from one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellTimes {
    pub in_time: Option<String>,
    pub out_time: Option<String>,
}

impl CellTimes {
    pub fn new(in_time: Option<&str>, out_time: Option<&str>) -> Self {
        Self {
            in_time: in_time.map(str::to_string),
            out_time: out_time.map(str::to_string),
        }
    }
}

/// Read entry/exit times from a cell.
///
/// Accepted text: `HH:MM-HH:MM` (any dash), several times separated by
/// whitespace (first is entry, last is exit), a single `HH:MM` (entry) or
/// `-HH:MM` (exit only). Numbers are spreadsheet times and give an entry.
/// Anything else yields no times.
pub fn parse_cell(cell: &Cell) -> CellTimes {
    match cell {
        Cell::Empty => CellTimes::default(),
        Cell::Number(n) => CellTimes {
            in_time: parse_to_minutes(*n).map(format_minutes),
            out_time: None,
        },
        Cell::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> CellTimes {
    if !CLOCK_CELL.is_match(text) {
        return CellTimes::default();
    }
    let times: Vec<String> = CLOCK_TOKEN
        .find_iter(text)
        .filter_map(|m| parse_to_minutes(m.as_str()))
        .map(format_minutes)
        .collect();

    match times.as_slice() {
        [] => CellTimes::default(),
        [only] if text.starts_with(DASHES) => CellTimes {
            in_time: None,
            out_time: Some(only.clone()),
        },
        [only] => CellTimes {
            in_time: Some(only.clone()),
            out_time: None,
        },
        [first, .., last] => CellTimes {
            in_time: Some(first.clone()),
            out_time: Some(last.clone()),
        },
    }
}
