//! Plan snapshot and planned-assignment models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Spreadsheet tables carried inside a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTables {
    /// Header row `[date, shift, line...]` followed by one row per (date, shift).
    #[serde(default)]
    pub demand: Vec<Vec<serde_json::Value>>,
}

/// One role position of a line template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePosition {
    pub role: String,
    #[serde(default = "default_count")]
    pub count: u32,
    /// Shift id → roster cell ("Name1, Name2/Name3").
    #[serde(default)]
    pub roster: BTreeMap<String, String>,
}

fn default_count() -> u32 {
    1
}

/// State of a planned slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[default]
    Filled,
    Manual,
    Reassigned,
    Vacancy,
}

impl SlotStatus {
    /// Slots in these states count as planned presence.
    pub fn is_occupied(self) -> bool {
        matches!(self, SlotStatus::Filled | SlotStatus::Manual | SlotStatus::Reassigned)
    }
}

/// Whether the slot is staffed from the line's own roster or by an RV worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    #[default]
    Home,
    External,
}

/// A manual override for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAssignment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "manual_status")]
    pub status: SlotStatus,
    #[serde(rename = "type", default)]
    pub kind: AssignmentKind,
}

fn manual_status() -> SlotStatus {
    SlotStatus::Manual
}

/// A whole schedule: line templates, demand and manual edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    #[serde(default)]
    pub raw_tables: RawTables,
    #[serde(default)]
    pub line_templates: BTreeMap<String, Vec<LinePosition>>,
    #[serde(default)]
    pub manual_assignments: BTreeMap<String, ManualAssignment>,
    #[serde(default)]
    pub schedule_dates: Vec<String>,
}

/// One slot of the expanded plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAssignment {
    pub slot_id: String,
    pub date: String,
    pub shift: String,
    pub line: String,
    pub role: String,
    /// Position of the slot within its (line, role).
    pub index: u32,
    pub name: Option<String>,
    pub status: SlotStatus,
    pub kind: AssignmentKind,
}

impl PlannedAssignment {
    /// Name of the worker counted as planned present, if any.
    pub fn occupant(&self) -> Option<&str> {
        if !self.status.is_occupied() {
            return None;
        }
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    pub fn is_external(&self) -> bool {
        self.kind == AssignmentKind::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "rawTables": {"demand": [["Дата", "Смена", "Линия 1"], ["01.03.2024", "1", 1]]},
            "lineTemplates": {"Линия 1": [{"role": "Оператор", "count": 2, "roster": {"1": "Иванов, Петров"}}]},
            "manualAssignments": {"01.03.2024|1|Линия 1|Оператор|1": {"name": "Сидоров", "type": "external"}},
            "scheduleDates": ["01.03.2024"]
        }"#;
        let snapshot: PlanSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.line_templates["Линия 1"][0].count, 2);
        let manual = &snapshot.manual_assignments["01.03.2024|1|Линия 1|Оператор|1"];
        assert_eq!(manual.status, SlotStatus::Manual);
        assert_eq!(manual.kind, AssignmentKind::External);
    }

    #[test]
    fn test_occupant_requires_occupied_status() {
        let mut slot = PlannedAssignment {
            slot_id: "x".to_string(),
            date: "01.03.2024".to_string(),
            shift: "1".to_string(),
            line: "Линия 1".to_string(),
            role: "Оператор".to_string(),
            index: 0,
            name: Some("Иванов".to_string()),
            status: SlotStatus::Reassigned,
            kind: AssignmentKind::Home,
        };
        assert_eq!(slot.occupant(), Some("Иванов"));
        slot.status = SlotStatus::Vacancy;
        assert_eq!(slot.occupant(), None);
    }
}
