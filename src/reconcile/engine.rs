//! Planned-vs-actual reconciliation for one date.

use std::collections::HashSet;

use tracing::debug;

use super::department::DepartmentIndex;
use crate::models::{
    AttendanceDataset, DayAttendance, PlanSnapshot, PlannedAssignment, Registry, VerificationRecord,
    VerificationStatus,
};
use crate::names::NameIndex;

/// Role label for badge-only people unknown to the registry.
pub const UNKNOWN_ROLE: &str = "Неизвестно";

/// Reconcile the planned slots of one date against that date's attendance.
///
/// Every occupied slot yields one record (`ok` or `missing`); every
/// attendance record with a time that no slot consumed yields one
/// `unexpected` record. Missing inputs give an empty result.
pub fn reconcile_date(
    planned: &[PlannedAssignment],
    day: Option<&DayAttendance>,
    registry: &Registry,
    departments: &mut DepartmentIndex,
) -> Vec<VerificationRecord> {
    let mut results = Vec::new();
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut consumed_names: NameIndex<()> = NameIndex::new();

    for slot in planned {
        let Some(name) = slot.occupant() else {
            continue;
        };
        let found = day.and_then(|d| d.lookup(name));
        if let Some((idx, record)) = found
            && consumed.insert(idx)
        {
            consumed_names.insert(record.raw_name.clone(), ());
        }

        let time = found
            .map(|(_, record)| record)
            .filter(|record| record.has_any_time())
            .and_then(|record| record.display_time());
        let status = if time.is_some() {
            VerificationStatus::Ok
        } else {
            VerificationStatus::Missing
        };

        results.push(VerificationRecord {
            name: name.to_string(),
            role: slot.role.clone(),
            shift: Some(slot.shift.clone()),
            line: Some(slot.line.clone()),
            plan: true,
            fact: status == VerificationStatus::Ok,
            time,
            status,
            department: departments.lookup(name),
        });
    }

    let Some(day) = day else {
        return results;
    };
    for (idx, record) in day.records().iter().enumerate() {
        if consumed.contains(&idx) || !record.has_any_time() {
            continue;
        }
        if consumed_names.contains(&record.raw_name) {
            debug!("{} treated as consumed by a similar planned name", record.raw_name);
            continue;
        }
        results.push(VerificationRecord {
            name: record.name.clone(),
            role: registry.role_of(&record.name).unwrap_or(UNKNOWN_ROLE).to_string(),
            shift: None,
            line: None,
            plan: false,
            fact: true,
            time: record.display_time(),
            status: VerificationStatus::Unexpected,
            department: departments.lookup(&record.name),
        });
    }
    results
}

/// Expand the plan for `date` and reconcile it against the dataset.
pub fn verify_date(
    date: &str,
    plan: Option<&PlanSnapshot>,
    attendance: &AttendanceDataset,
    registry: &Registry,
    departments: &mut DepartmentIndex,
) -> Vec<VerificationRecord> {
    let planned = plan.map(|p| p.planned_for_date(date, registry)).unwrap_or_default();
    let records = reconcile_date(&planned, attendance.day(date), registry, departments);
    debug!(
        "Reconciled {}: {} planned slots, {} records",
        date,
        planned.len(),
        records.len()
    );
    records
}
