//! Attendance ("fact") records built from badge exports.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::names::{NameIndex, normalize};
use crate::time::{date_sort_key, duration, parse_to_minutes};

/// One person's badge activity on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Canonical name (registry name when the badge name resolved to one).
    pub name: String,
    /// Name as it appears in the badge export.
    pub raw_name: String,
    pub date: String,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub has_overnight_shift: bool,
    pub next_day_exit: Option<String>,
    pub next_day_date: Option<String>,
    pub clean_time: Option<String>,
}

/// Result of checking an attendance record for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactState {
    Ok,
    Incomplete,
    Missing,
}

impl AttendanceRecord {
    /// Whether any entry or exit was scanned.
    pub fn has_any_time(&self) -> bool {
        self.entry_time.is_some() || self.exit_time.is_some() || self.next_day_exit.is_some()
    }

    /// Display string for verification views.
    pub fn display_time(&self) -> Option<String> {
        match (&self.entry_time, &self.exit_time, &self.next_day_exit) {
            (Some(entry), _, Some(next)) if self.has_overnight_shift => Some(format!("{entry} → {next} (+1)")),
            (Some(entry), None, None) if self.has_overnight_shift => Some(format!("Вход: {entry} (ночная)")),
            (Some(entry), None, _) => Some(format!("Вход: {entry}")),
            (Some(entry), Some(exit), _) => Some(format!("{entry} → {exit}")),
            (None, Some(exit), _) => Some(format!("Выход: {exit}")),
            (None, None, Some(next)) => Some(format!("Выход: {next} (+1)")),
            (None, None, None) => None,
        }
    }

    /// Minutes worked, counted only for same-day entry and exit.
    pub fn worked_minutes(&self) -> Option<u32> {
        let entry = parse_to_minutes(self.entry_time.as_deref()?)?;
        let exit = parse_to_minutes(self.exit_time.as_deref()?)?;
        Some(duration(entry, exit))
    }
}

/// Classify a record as ok, incomplete (one side missing) or missing.
pub fn validate_fact_entry(record: Option<&AttendanceRecord>) -> FactState {
    let Some(record) = record else {
        return FactState::Missing;
    };
    let has_entry = record.entry_time.is_some();
    let has_exit = record.exit_time.is_some();
    if record.clean_time.is_some() || (has_entry && has_exit) {
        FactState::Ok
    } else if has_entry || has_exit || record.next_day_exit.is_some() {
        FactState::Incomplete
    } else {
        FactState::Missing
    }
}

/// All attendance records for one date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<AttendanceRecord>", into = "Vec<AttendanceRecord>")]
pub struct DayAttendance {
    records: Vec<AttendanceRecord>,
    by_key: HashMap<String, usize>,
    by_raw_key: HashMap<String, usize>,
    fuzzy: NameIndex<usize>,
}

impl From<Vec<AttendanceRecord>> for DayAttendance {
    fn from(records: Vec<AttendanceRecord>) -> Self {
        let mut day = Self::default();
        for record in records {
            day.insert(record);
        }
        day
    }
}

impl From<DayAttendance> for Vec<AttendanceRecord> {
    fn from(day: DayAttendance) -> Self {
        day.records
    }
}

impl DayAttendance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. The first record for a key keeps the exact slots.
    pub fn insert(&mut self, record: AttendanceRecord) {
        let idx = self.records.len();
        let key = normalize(&record.name);
        if !key.is_empty() {
            self.by_key.entry(key).or_insert(idx);
        }
        let raw_key = normalize(&record.raw_name);
        if !raw_key.is_empty() {
            self.by_raw_key.entry(raw_key).or_insert(idx);
        }
        self.fuzzy.insert(record.raw_name.clone(), idx);
        self.records.push(record);
    }

    /// Resolve a name: canonical key, raw key, then surname-bucket fuzzy scan.
    pub fn lookup(&self, name: &str) -> Option<(usize, &AttendanceRecord)> {
        let key = normalize(name);
        let idx = self
            .by_key
            .get(&key)
            .or_else(|| self.by_raw_key.get(&key))
            .copied()
            .or_else(|| self.fuzzy.find_fuzzy(name).map(|(_, &idx)| idx))?;
        Some((idx, &self.records[idx]))
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Attendance for every date of an uploaded badge export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceDataset {
    days: BTreeMap<String, DayAttendance>,
}

impl AttendanceDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: AttendanceRecord) {
        self.days.entry(record.date.clone()).or_default().insert(record);
    }

    pub fn day(&self, date: &str) -> Option<&DayAttendance> {
        self.days.get(date)
    }

    /// Dates in calendar order.
    pub fn dates(&self) -> Vec<String> {
        let mut dates: Vec<String> = self.days.keys().cloned().collect();
        dates.sort_by_key(|d| date_sort_key(d));
        dates
    }

    pub fn records(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.days.values().flat_map(|day| day.records())
    }

    /// Number of records across all dates.
    pub fn len(&self) -> usize {
        self.days.values().map(DayAttendance::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<AttendanceRecord> for AttendanceDataset {
    fn from_iter<I: IntoIterator<Item = AttendanceRecord>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for record in iter {
            dataset.insert(record);
        }
        dataset
    }
}
