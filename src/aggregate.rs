//! Per-employee rollups over a whole schedule.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::models::{
    AttendanceDataset, EmployeeEvent, EmployeeSummary, FactState, PlanInfo, PlanSnapshot, PlannedAssignment,
    Registry, validate_fact_entry,
};
use crate::names::{matches, normalize};
use crate::reconcile::{DepartmentIndex, UNKNOWN_ROLE};

/// Year used only to order day/month pairs.
const REFERENCE_YEAR: i32 = 2000;

/// An identity to summarize.
struct Employee {
    name: String,
    role: String,
}

/// Order events by day and month; unparseable dates go last.
fn event_sort_key(date: &str) -> (bool, u32, u32, String) {
    let mut parts = date.trim().split('.');
    let day = parts.next().and_then(|d| d.parse::<u32>().ok());
    let month = parts.next().and_then(|m| m.parse::<u32>().ok());
    let parsed = day
        .zip(month)
        .and_then(|(d, m)| NaiveDate::from_ymd_opt(REFERENCE_YEAR, m, d));
    match parsed {
        Some(d) => (false, d.month(), d.day(), date.to_string()),
        None => (true, 0, 0, date.to_string()),
    }
}

/// First occupied slot for `name`: exact key first, then the matcher.
fn find_slot<'a>(slots: &'a [PlannedAssignment], name: &str) -> Option<&'a PlannedAssignment> {
    let key = normalize(name);
    slots
        .iter()
        .find(|slot| slot.occupant().is_some_and(|n| normalize(n) == key))
        .or_else(|| {
            slots
                .iter()
                .find(|slot| slot.occupant().is_some_and(|n| matches(n, name)))
        })
}

fn employees(registry: &Registry, attendance: &AttendanceDataset) -> Vec<Employee> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for worker in registry.workers() {
        if seen.insert(normalize(&worker.name)) {
            result.push(Employee {
                name: worker.name.clone(),
                role: worker.display_role().to_string(),
            });
        }
    }
    for record in attendance.records() {
        let key = normalize(&record.name);
        if key.is_empty() || seen.contains(&key) || registry.find(&record.name).is_some() {
            continue;
        }
        seen.insert(key);
        result.push(Employee {
            name: record.name.clone(),
            role: UNKNOWN_ROLE.to_string(),
        });
    }
    result
}

/// Build one summary per employee across every schedule date.
///
/// Without any planned slot the rollup runs in attendance-only mode: no
/// shifts are counted and events carry no plan info, but errors and hours
/// still come from attendance.
pub fn aggregate(
    plan: Option<&PlanSnapshot>,
    attendance: &AttendanceDataset,
    registry: &Registry,
    departments: &mut DepartmentIndex,
) -> Vec<EmployeeSummary> {
    let mut dates = plan.map(PlanSnapshot::dates).unwrap_or_default();
    if dates.is_empty() {
        dates = attendance.dates();
    }

    let planned: HashMap<&str, Vec<PlannedAssignment>> = match plan {
        Some(plan) => dates
            .iter()
            .map(|date| {
                let slots = plan
                    .planned_for_date(date, registry)
                    .into_iter()
                    .filter(|slot| slot.occupant().is_some())
                    .collect();
                (date.as_str(), slots)
            })
            .collect(),
        None => HashMap::new(),
    };
    let plan_mode = planned.values().any(|slots| !slots.is_empty());
    if !plan_mode {
        info!("No planned slots, summarizing attendance only");
    }

    let mut summaries = Vec::new();
    for employee in employees(registry, attendance) {
        let mut summary = EmployeeSummary {
            department: departments.lookup(&employee.name),
            name: employee.name,
            role: employee.role,
            shifts_count: 0,
            rv_count: 0,
            error_count: 0,
            hours_total: 0,
            events: Vec::new(),
        };

        for date in &dates {
            let slot = planned
                .get(date.as_str())
                .filter(|_| plan_mode)
                .and_then(|slots| find_slot(slots, &summary.name));
            if let Some(slot) = slot {
                if slot.is_external() {
                    summary.rv_count += 1;
                } else {
                    summary.shifts_count += 1;
                }
            }

            let record = attendance.day(date).and_then(|day| day.lookup(&summary.name)).map(|(_, r)| r);
            let fact = validate_fact_entry(record);
            if fact == FactState::Incomplete {
                summary.error_count += 1;
            }
            let minutes = record.and_then(|r| r.worked_minutes()).unwrap_or(0);
            summary.hours_total += minutes;

            summary.events.push(EmployeeEvent {
                date: date.clone(),
                plan_info: slot.map(|s| PlanInfo {
                    shift: s.shift.clone(),
                    line: s.line.clone(),
                    role: s.role.clone(),
                    external: s.is_external(),
                }),
                fact,
                time: record.and_then(|r| r.display_time()),
                minutes,
            });
        }

        summary.events.sort_by_key(|e| event_sort_key(&e.date));
        summaries.push(summary);
    }

    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Aggregated {} employees over {} dates", summaries.len(), dates.len());
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentKind, AttendanceRecord, ManualAssignment, SlotStatus, Worker};

    fn plan() -> PlanSnapshot {
        serde_json::from_str(
            r#"{
                "rawTables": {"demand": [
                    ["Дата", "Смена", "Линия 1"],
                    ["01.03.2024", "1", 1],
                    ["02.03.2024", "1", 1]
                ]},
                "lineTemplates": {"Линия 1": [{"role": "Оператор", "count": 1, "roster": {"1": "Иванов И.П."}}]},
                "scheduleDates": ["02.03.2024", "01.03.2024"]
            }"#,
        )
        .unwrap()
    }

    fn fact(name: &str, date: &str, entry: Option<&str>, exit: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            name: name.to_string(),
            raw_name: name.to_string(),
            date: date.to_string(),
            entry_time: entry.map(str::to_string),
            exit_time: exit.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_shifts_errors_and_hours() {
        let registry = Registry::from(vec![Worker::new("Иванов Иван Петрович", Some("Оператор"))]);
        let attendance: AttendanceDataset = vec![
            fact("Иванов Иван Петрович", "01.03.2024", Some("08:00"), Some("20:00")),
            fact("Иванов Иван Петрович", "02.03.2024", Some("08:00"), None),
        ]
        .into_iter()
        .collect();

        let summaries = aggregate(Some(&plan()), &attendance, &registry, &mut DepartmentIndex::new());
        assert_eq!(summaries.len(), 1);
        let ivanov = &summaries[0];
        assert_eq!(ivanov.shifts_count, 2);
        assert_eq!(ivanov.rv_count, 0);
        assert_eq!(ivanov.error_count, 1);
        assert_eq!(ivanov.hours_total, 720);
        let dates: Vec<_> = ivanov.events.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["01.03.2024", "02.03.2024"]);
        assert_eq!(ivanov.events[1].fact, FactState::Incomplete);
        assert_eq!(ivanov.events[0].plan_info.as_ref().map(|p| p.line.as_str()), Some("Линия 1"));
    }

    #[test]
    fn test_external_slot_counts_as_rv() {
        let mut plan = plan();
        plan.manual_assignments.insert(
            "02.03.2024|1|Линия 1|Оператор|0".to_string(),
            ManualAssignment {
                name: Some("Петров Пётр".to_string()),
                status: SlotStatus::Manual,
                kind: AssignmentKind::External,
            },
        );
        let registry = Registry::from(vec![Worker::new("Петров Пётр", None)]);
        let summaries = aggregate(Some(&plan), &AttendanceDataset::new(), &registry, &mut DepartmentIndex::new());
        assert_eq!(summaries[0].rv_count, 1);
        assert_eq!(summaries[0].shifts_count, 0);
        assert_eq!(summaries[0].role, "Не указано");
    }

    #[test]
    fn test_overnight_without_same_day_exit_adds_no_hours() {
        let mut night = fact("Сидоров С.", "01.03.2024", Some("20:00"), None);
        night.has_overnight_shift = true;
        night.next_day_exit = Some("08:00".to_string());
        night.next_day_date = Some("02.03.2024".to_string());
        night.clean_time = Some("20:00-08:00 (+1)".to_string());
        let attendance: AttendanceDataset = vec![night].into_iter().collect();

        let summaries = aggregate(None, &attendance, &Registry::new(), &mut DepartmentIndex::new());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].role, UNKNOWN_ROLE);
        assert_eq!(summaries[0].hours_total, 0);
        assert_eq!(summaries[0].error_count, 0);
    }

    #[test]
    fn test_attendance_only_mode() {
        let registry = Registry::from(vec![Worker::new("Иванов Иван Петрович", Some("Оператор"))]);
        let attendance: AttendanceDataset = vec![
            fact("Иванов Иван Петрович", "01.03.2024", None, Some("20:00")),
            fact("Козлов К.", "01.03.2024", Some("08:00"), Some("17:00")),
        ]
        .into_iter()
        .collect();
        let summaries = aggregate(None, &attendance, &registry, &mut DepartmentIndex::new());
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.shifts_count == 0));
        assert!(summaries.iter().flat_map(|s| &s.events).all(|e| e.plan_info.is_none()));
        let ivanov = summaries.iter().find(|s| s.name.starts_with("Иванов")).unwrap();
        assert_eq!(ivanov.error_count, 1);
        let kozlov = summaries.iter().find(|s| s.name.starts_with("Козлов")).unwrap();
        assert_eq!(kozlov.hours_total, 540);
    }

    #[test]
    fn test_event_sort_key_uses_day_and_month() {
        let mut dates = vec!["05.03.2024", "29.02.2024", "oops", "01.03.2024"];
        dates.sort_by_key(|d| event_sort_key(d));
        assert_eq!(dates, vec!["29.02.2024", "01.03.2024", "05.03.2024", "oops"]);
    }
}
