//! End-to-end checks: badge CSV in, verification and diff out.

use std::io::Write;

use serde_json::json;
use shift_verify::aggregate::aggregate;
use shift_verify::attendance::{DEFAULT_SKIP_VALUE, load_csv, scan_badge_grid};
use shift_verify::models::{AttendanceDataset, DiffEntry, PlanSnapshot, Registry, VerificationStatus};
use shift_verify::plan::{assign_home_lines, diff_plans};
use shift_verify::reconcile::{DepartmentIndex, UNKNOWN_ROLE, verify_date};

const DATE: &str = "01.03.2024";

fn registry() -> Registry {
    serde_json::from_value(json!([
        {"name": "Иванов Иван Петрович", "role": "Оператор"},
        {"name": "Сидоров Семён", "role": "Наладчик"}
    ]))
    .unwrap()
}

fn plan(line_a: &str, line_b: &str) -> PlanSnapshot {
    serde_json::from_value(json!({
        "rawTables": {"demand": [["Дата", "Смена", "Линия 1", "Линия 2"], [DATE, "1", 1, 1]]},
        "lineTemplates": {
            "Линия 1": [{"role": "Оператор", "roster": {"1": line_a}}],
            "Линия 2": [{"role": "Оператор", "roster": {"1": line_b}}]
        }
    }))
    .unwrap()
}

fn import(lines: &[&str], registry: &Registry) -> AttendanceDataset {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    let grid = load_csv(file.path()).unwrap();
    scan_badge_grid(&grid, DEFAULT_SKIP_VALUE).unwrap().into_dataset(registry)
}

#[test]
fn test_abbreviated_badge_name_verifies_planned_worker() {
    let mut registry = registry();
    let plan = plan("Иванов Иван Петрович", "");
    assign_home_lines(&mut registry, &plan);
    let attendance = import(&["№;ФИО;01.03.2024", "1;Иванов И.П.;08:00-20:00"], &registry);

    let departments: std::collections::BTreeMap<String, String> =
        [("Иванов Иван Петрович".to_string(), "Цех 1".to_string())].into_iter().collect();
    let mut departments = DepartmentIndex::from(departments);

    let records = verify_date(DATE, Some(&plan), &attendance, &registry, &mut departments);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "Иванов Иван Петрович");
    assert_eq!(record.status, VerificationStatus::Ok);
    assert!(record.plan && record.fact);
    assert_eq!(record.time.as_deref(), Some("08:00 → 20:00"));
    assert_eq!(record.department.as_deref(), Some("Цех 1"));
}

#[test]
fn test_unknown_badge_name_is_unexpected() {
    let registry = registry();
    let plan = plan("Иванов Иван Петрович", "");
    let attendance = import(
        &["№;ФИО;01.03.2024", "1;Иванов И.П.;08:00-20:00", "2;Кузнецов Олег;09:00-18:00"],
        &registry,
    );

    let records = verify_date(DATE, Some(&plan), &attendance, &registry, &mut DepartmentIndex::new());
    let unexpected: Vec<_> = records
        .iter()
        .filter(|r| r.status == VerificationStatus::Unexpected)
        .collect();
    assert_eq!(unexpected.len(), 1);
    assert_eq!(unexpected[0].name, "Кузнецов Олег");
    assert_eq!(unexpected[0].role, UNKNOWN_ROLE);
    assert!(!unexpected[0].plan);
    assert_eq!(unexpected[0].time.as_deref(), Some("09:00 → 18:00"));
}

#[test]
fn test_planned_worker_without_badge_is_missing() {
    let registry = registry();
    let plan = plan("Иванов Иван Петрович", "Сидоров Семён");
    let attendance = import(&["№;ФИО;01.03.2024", "1;Иванов И.П.;08:00-20:00"], &registry);

    let records = verify_date(DATE, Some(&plan), &attendance, &registry, &mut DepartmentIndex::new());
    let missing: Vec<_> = records
        .iter()
        .filter(|r| r.status == VerificationStatus::Missing)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].name, "Сидоров Семён");
    assert_eq!(missing[0].line.as_deref(), Some("Линия 2"));
    assert!(!missing[0].fact);
}

#[test]
fn test_overnight_shift_is_one_record() {
    let registry = registry();
    let attendance = import(&["№;ФИО;01.03.2024;02.03.2024", "1;Сидоров Семён;20:00;-08:00"], &registry);
    assert_eq!(attendance.len(), 1);

    let day = attendance.day(DATE).unwrap();
    let (_, record) = day.lookup("Сидоров Семён").unwrap();
    assert!(record.has_overnight_shift);
    assert_eq!(record.next_day_date.as_deref(), Some("02.03.2024"));
    assert_eq!(record.display_time().as_deref(), Some("20:00 → 08:00 (+1)"));
    assert!(attendance.day("02.03.2024").is_none());
}

#[test]
fn test_employee_summary_counts_shift_hours() {
    let registry = registry();
    let plan = plan("Иванов Иван Петрович", "");
    let attendance = import(&["№;ФИО;01.03.2024", "1;Иванов И.П.;08:00-20:00"], &registry);

    let summaries = aggregate(Some(&plan), &attendance, &registry, &mut DepartmentIndex::new());
    let ivanov = summaries.iter().find(|s| s.name == "Иванов Иван Петрович").unwrap();
    assert_eq!(ivanov.shifts_count, 1);
    assert_eq!(ivanov.error_count, 0);
    assert_eq!(ivanov.hours_total, 720);
    assert_eq!(ivanov.events.len(), 1);
}

#[test]
fn test_line_change_is_reported_as_moved() {
    let registry = registry();
    let master = plan("Иванов Иван Петрович", "");
    let operational = plan("", "Иванов Иван Петрович");

    let diff = diff_plans(&master, &operational, &registry);
    assert_eq!(diff.len(), 1);
    match &diff[0] {
        DiffEntry::Moved { name, from, to, .. } => {
            assert_eq!(name, "Иванов Иван Петрович");
            assert_eq!(from.line, "Линия 1");
            assert_eq!(to.line, "Линия 2");
        }
        other => panic!("expected a move, got {other:?}"),
    }
}
