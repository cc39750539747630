//! Per-person attendance timeline from daily badge cells.
//!
//! Cells are walked in date order carrying at most one open (entry without
//! exit) shift. The next exit closes the open shift on the day it started,
//! so an overnight shift is a single record.

use std::collections::HashMap;

use tracing::debug;

use super::cell::CellTimes;
use crate::models::AttendanceRecord;
use crate::time::date_sort_key;

/// An entry still waiting for its exit.
#[derive(Debug, Clone)]
struct PendingShift {
    time: String,
    date: String,
}

struct Timeline<'a> {
    name: &'a str,
    raw_name: &'a str,
    records: Vec<AttendanceRecord>,
    by_date: HashMap<String, usize>,
}

impl<'a> Timeline<'a> {
    fn new(name: &'a str, raw_name: &'a str) -> Self {
        Self {
            name,
            raw_name,
            records: Vec::new(),
            by_date: HashMap::new(),
        }
    }

    fn record(&self, date: &str) -> AttendanceRecord {
        AttendanceRecord {
            name: self.name.to_string(),
            raw_name: self.raw_name.to_string(),
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// Store a record, replacing any earlier record for the same date.
    fn put(&mut self, record: AttendanceRecord) {
        match self.by_date.get(&record.date) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.by_date.insert(record.date.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    fn complete(&mut self, date: &str, entry: &str, exit: &str) {
        self.put(AttendanceRecord {
            entry_time: Some(entry.to_string()),
            exit_time: Some(exit.to_string()),
            clean_time: Some(format!("{entry}-{exit}")),
            ..self.record(date)
        });
    }

    fn open(&mut self, date: &str, entry: &str) -> PendingShift {
        self.put(AttendanceRecord {
            entry_time: Some(entry.to_string()),
            has_overnight_shift: true,
            ..self.record(date)
        });
        PendingShift {
            time: entry.to_string(),
            date: date.to_string(),
        }
    }

    fn exit_only(&mut self, date: &str, exit: &str) {
        self.put(AttendanceRecord {
            exit_time: Some(exit.to_string()),
            ..self.record(date)
        });
    }

    fn close(&mut self, pending: &PendingShift, exit_date: &str, exit: &str) {
        self.put(AttendanceRecord {
            entry_time: Some(pending.time.clone()),
            has_overnight_shift: true,
            next_day_exit: Some(exit.to_string()),
            next_day_date: Some(exit_date.to_string()),
            clean_time: Some(format!("{}-{exit} (+1)", pending.time)),
            ..self.record(&pending.date)
        });
    }
}

/// Build one person's attendance records from their dated cells.
///
/// `name` is the canonical name stored on the records, `raw_name` the name
/// as written in the badge export. The output holds at most one record per
/// date, in date order.
pub fn build_person_events(name: &str, raw_name: &str, cells: &[(String, CellTimes)]) -> Vec<AttendanceRecord> {
    let mut sorted: Vec<&(String, CellTimes)> = cells.iter().collect();
    sorted.sort_by_key(|(date, _)| date_sort_key(date));

    let mut timeline = Timeline::new(name, raw_name);
    let mut pending: Option<PendingShift> = None;

    for (date, times) in sorted {
        match (pending.take(), times.in_time.as_deref(), times.out_time.as_deref()) {
            (None, Some(entry), Some(exit)) => timeline.complete(date, entry, exit),
            (None, Some(entry), None) => pending = Some(timeline.open(date, entry)),
            (None, None, Some(exit)) => timeline.exit_only(date, exit),
            (Some(p), entry, Some(exit)) => {
                timeline.close(&p, date, exit);
                if let Some(entry) = entry {
                    pending = Some(timeline.open(date, entry));
                }
            }
            (Some(p), Some(entry), None) => {
                debug!("{}: entry on {} abandoned by new entry on {}", raw_name, p.date, date);
                pending = Some(timeline.open(date, entry));
            }
            (open, None, None) => pending = open,
        }
    }

    timeline.records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(items: &[(&str, Option<&str>, Option<&str>)]) -> Vec<(String, CellTimes)> {
        items
            .iter()
            .map(|&(date, i, o)| (date.to_string(), CellTimes::new(i, o)))
            .collect()
    }

    #[test]
    fn test_complete_day() {
        let records = build_person_events("Иванов", "Иванов И.", &cells(&[("01.03.2024", Some("08:00"), Some("20:00"))]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry_time.as_deref(), Some("08:00"));
        assert_eq!(records[0].exit_time.as_deref(), Some("20:00"));
        assert!(!records[0].has_overnight_shift);
        assert_eq!(records[0].clean_time.as_deref(), Some("08:00-20:00"));
        assert_eq!(records[0].raw_name, "Иванов И.");
    }

    #[test]
    fn test_overnight_shift_joins_days() {
        let records = build_person_events(
            "Иванов",
            "Иванов",
            &cells(&[("02.03.2024", None, Some("08:00")), ("01.03.2024", Some("20:00"), None)]),
        );
        assert_eq!(records.len(), 1);
        let night = &records[0];
        assert_eq!(night.date, "01.03.2024");
        assert!(night.has_overnight_shift);
        assert_eq!(night.exit_time, None);
        assert_eq!(night.next_day_exit.as_deref(), Some("08:00"));
        assert_eq!(night.next_day_date.as_deref(), Some("02.03.2024"));
        assert_eq!(night.clean_time.as_deref(), Some("20:00-08:00 (+1)"));
    }

    #[test]
    fn test_exit_and_new_entry_same_cell() {
        let records = build_person_events(
            "Иванов",
            "Иванов",
            &cells(&[
                ("01.03.2024", Some("20:00"), None),
                ("02.03.2024", Some("20:00"), Some("08:00")),
                ("03.03.2024", None, Some("08:00")),
            ]),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].next_day_date.as_deref(), Some("02.03.2024"));
        assert_eq!(records[1].date, "02.03.2024");
        assert_eq!(records[1].entry_time.as_deref(), Some("20:00"));
        assert_eq!(records[1].next_day_date.as_deref(), Some("03.03.2024"));
    }

    #[test]
    fn test_second_entry_abandons_pending() {
        let records = build_person_events(
            "Иванов",
            "Иванов",
            &cells(&[("01.03.2024", Some("20:00"), None), ("02.03.2024", Some("21:00"), None)]),
        );
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.next_day_exit.is_none() && r.exit_time.is_none()));
        assert!(records.iter().all(|r| r.has_overnight_shift));
    }

    #[test]
    fn test_exit_after_gap_closes_pending() {
        let records = build_person_events(
            "Иванов",
            "Иванов",
            &cells(&[
                ("01.03.2024", Some("20:00"), None),
                ("02.03.2024", None, None),
                ("03.03.2024", None, Some("08:00")),
            ]),
        );
        assert_eq!(records.len(), 1);
        let night = &records[0];
        assert_eq!(night.date, "01.03.2024");
        assert!(night.has_overnight_shift);
        assert_eq!(night.exit_time, None);
        assert_eq!(night.next_day_exit.as_deref(), Some("08:00"));
        assert_eq!(night.next_day_date.as_deref(), Some("03.03.2024"));
    }

    #[test]
    fn test_empty_cell_adds_nothing() {
        let records = build_person_events(
            "Иванов",
            "Иванов",
            &cells(&[("01.03.2024", Some("20:00"), None), ("01.03.2024", None, None)]),
        );
        assert_eq!(records.len(), 1);
        assert!(build_person_events("Иванов", "Иванов", &[]).is_empty());
    }
}
