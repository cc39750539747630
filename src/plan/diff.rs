//! Structural comparison of two plan snapshots.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::{DiffEntry, PlanSnapshot, PlannedAssignment, Position, Registry};
use crate::names::normalize;
use crate::time::date_sort_key;

/// A worker occupying a slot.
#[derive(Debug, Clone)]
struct Occupant {
    key: String,
    name: String,
    position: Position,
}

type GroupKey = (String, String);

fn occupants(slots: Vec<PlannedAssignment>) -> BTreeMap<GroupKey, Vec<Occupant>> {
    let mut groups: BTreeMap<GroupKey, Vec<Occupant>> = BTreeMap::new();
    for slot in slots {
        let Some(name) = slot.occupant() else {
            continue;
        };
        let key = normalize(name);
        if key.is_empty() {
            continue;
        }
        let occupant = Occupant {
            key,
            name: name.to_string(),
            position: Position {
                line: slot.line.clone(),
                role: slot.role.clone(),
            },
        };
        groups.entry((slot.date, slot.shift)).or_default().push(occupant);
    }
    groups
}

/// Compare the master plan against the operational plan.
///
/// Within each (date, shift) a worker present in both plans at a different
/// position is `Moved`. Workers left over on one side are paired by
/// position in slot order into `Replaced`; the rest are `Added` or `Lost`.
pub fn diff_plans(master: &PlanSnapshot, operational: &PlanSnapshot, registry: &Registry) -> Vec<DiffEntry> {
    let mut master_groups = occupants(master.all_planned(registry));
    let mut operational_groups = occupants(operational.all_planned(registry));

    let mut keys: Vec<GroupKey> = master_groups.keys().chain(operational_groups.keys()).cloned().collect();
    keys.sort_by(|a, b| {
        date_sort_key(&a.0)
            .cmp(&date_sort_key(&b.0))
            .then_with(|| shift_sort_key(&a.1).cmp(&shift_sort_key(&b.1)))
    });
    keys.dedup();

    let mut entries = Vec::new();
    for key in keys {
        let before = master_groups.remove(&key).unwrap_or_default();
        let after = operational_groups.remove(&key).unwrap_or_default();
        let (date, shift) = key;
        entries.extend(diff_group(&date, &shift, &before, &after));
    }
    debug!("Plan diff produced {} entries", entries.len());
    entries
}

/// Shift ids sort numerically when they are numbers.
fn shift_sort_key(shift: &str) -> (bool, u64, String) {
    match shift.trim().parse::<u64>() {
        Ok(n) => (false, n, shift.to_string()),
        Err(_) => (true, 0, shift.to_string()),
    }
}

fn diff_group(date: &str, shift: &str, master: &[Occupant], operational: &[Occupant]) -> Vec<DiffEntry> {
    let first_by_key = |occupants: &[Occupant]| {
        let mut map: HashMap<String, usize> = HashMap::new();
        for (idx, occ) in occupants.iter().enumerate() {
            map.entry(occ.key.clone()).or_insert(idx);
        }
        map
    };
    let master_by_key = first_by_key(master);
    let operational_by_key = first_by_key(operational);

    let mut moved = Vec::new();
    for (idx, before) in master.iter().enumerate() {
        if master_by_key[&before.key] != idx {
            continue;
        }
        if let Some(&after_idx) = operational_by_key.get(&before.key) {
            let after = &operational[after_idx];
            if after.position != before.position {
                moved.push(DiffEntry::Moved {
                    name: after.name.clone(),
                    from: before.position.clone(),
                    to: after.position.clone(),
                    date: date.to_string(),
                    shift: shift.to_string(),
                });
            }
        }
    }

    let lost: Vec<&Occupant> = master
        .iter()
        .filter(|occ| !operational_by_key.contains_key(&occ.key))
        .collect();
    let mut added: Vec<Option<&Occupant>> = operational
        .iter()
        .filter(|occ| !master_by_key.contains_key(&occ.key))
        .map(Some)
        .collect();

    let mut replaced = Vec::new();
    let mut unpaired_lost = Vec::new();
    for before in lost {
        let partner = added
            .iter_mut()
            .find(|candidate| candidate.is_some_and(|after| after.position == before.position))
            .and_then(Option::take);
        match partner {
            Some(after) => replaced.push(DiffEntry::Replaced {
                from_name: before.name.clone(),
                to_name: after.name.clone(),
                line: before.position.line.clone(),
                role: before.position.role.clone(),
                date: date.to_string(),
                shift: shift.to_string(),
            }),
            None => unpaired_lost.push(before),
        }
    }

    let plain = |occ: &Occupant, added: bool| {
        let (name, date, shift) = (occ.name.clone(), date.to_string(), shift.to_string());
        let (line, role) = (occ.position.line.clone(), occ.position.role.clone());
        if added {
            DiffEntry::Added { name, date, shift, line, role }
        } else {
            DiffEntry::Lost { name, date, shift, line, role }
        }
    };

    let mut entries = moved;
    entries.extend(replaced);
    entries.extend(added.into_iter().flatten().map(|occ| plain(occ, true)));
    entries.extend(unpaired_lost.into_iter().map(|occ| plain(occ, false)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinePosition, RawTables};
    use serde_json::json;

    const DATE: &str = "01.03.2024";

    fn plan(lines: &[(&str, &str, &str)]) -> PlanSnapshot {
        let mut snapshot = PlanSnapshot {
            raw_tables: RawTables {
                demand: vec![
                    vec![json!("Дата"), json!("Смена"), json!("A"), json!("B")],
                    vec![json!(DATE), json!("1"), json!(1), json!(1)],
                ],
            },
            schedule_dates: vec![DATE.to_string()],
            ..Default::default()
        };
        for &(line, role, roster) in lines {
            snapshot.line_templates.entry(line.to_string()).or_default().push(LinePosition {
                role: role.to_string(),
                count: 1,
                roster: [("1".to_string(), roster.to_string())].into_iter().collect(),
            });
        }
        snapshot
    }

    #[test]
    fn test_moved_worker_is_single_entry() {
        let master = plan(&[("A", "Оператор", "Иванов"), ("B", "Наладчик", "")]);
        let operational = plan(&[("A", "Оператор", ""), ("B", "Наладчик", "Иванов")]);
        let diff = diff_plans(&master, &operational, &Registry::new());
        assert_eq!(
            diff,
            vec![DiffEntry::Moved {
                name: "Иванов".to_string(),
                from: Position {
                    line: "A".to_string(),
                    role: "Оператор".to_string()
                },
                to: Position {
                    line: "B".to_string(),
                    role: "Наладчик".to_string()
                },
                date: DATE.to_string(),
                shift: "1".to_string(),
            }]
        );
    }

    #[test]
    fn test_same_slot_swap_is_replaced() {
        let master = plan(&[("A", "Оператор", "Иванов")]);
        let operational = plan(&[("A", "Оператор", "Петров")]);
        let diff = diff_plans(&master, &operational, &Registry::new());
        assert_eq!(diff.len(), 1);
        assert!(matches!(
            &diff[0],
            DiffEntry::Replaced { from_name, to_name, .. } if from_name == "Иванов" && to_name == "Петров"
        ));
    }

    #[test]
    fn test_added_and_lost_at_different_positions() {
        let master = plan(&[("A", "Оператор", "Иванов"), ("B", "Наладчик", "")]);
        let operational = plan(&[("A", "Оператор", ""), ("B", "Наладчик", "Петров")]);
        let diff = diff_plans(&master, &operational, &Registry::new());
        let kinds: Vec<_> = diff.iter().map(|d| (d.kind_label(), d.name())).collect();
        assert_eq!(kinds, vec![("added", "Петров"), ("lost", "Иванов")]);
    }

    #[test]
    fn test_rotation_prefers_moved() {
        // Иванов moves A→B, Петров leaves B, Сидоров takes A.
        let master = plan(&[("A", "Оператор", "Иванов"), ("B", "Оператор", "Петров")]);
        let operational = plan(&[("A", "Оператор", "Сидоров"), ("B", "Оператор", "Иванов")]);
        let diff = diff_plans(&master, &operational, &Registry::new());
        let kinds: Vec<_> = diff.iter().map(|d| (d.kind_label(), d.name())).collect();
        assert_eq!(kinds, vec![("moved", "Иванов"), ("added", "Сидоров"), ("lost", "Петров")]);
    }

    #[test]
    fn test_identical_plans_have_no_diff() {
        let master = plan(&[("A", "Оператор", "Иванов, Петров")]);
        assert!(diff_plans(&master, &master.clone(), &Registry::new()).is_empty());
    }

    #[test]
    fn test_groups_sorted_by_date_then_shift() {
        let mut master = plan(&[("A", "Оператор", "Иванов")]);
        master.raw_tables.demand.push(vec![json!("28.02.2024"), json!("10"), json!(1), json!(0)]);
        master.raw_tables.demand.push(vec![json!("28.02.2024"), json!("2"), json!(1), json!(0)]);
        master.schedule_dates = vec![DATE.to_string(), "28.02.2024".to_string()];
        master.line_templates.get_mut("A").unwrap()[0]
            .roster
            .extend([("10".to_string(), "Козлов".to_string()), ("2".to_string(), "Орлов".to_string())]);
        let diff = diff_plans(&master, &PlanSnapshot::default(), &Registry::new());
        let order: Vec<_> = diff.iter().map(|d| (d.date(), d.shift())).collect();
        assert_eq!(order, vec![("28.02.2024", "2"), ("28.02.2024", "10"), (DATE, "1")]);
    }
}
