//! Per-employee rollups across a whole schedule.

use serde::{Deserialize, Serialize};

use super::attendance::FactState;

/// Where an employee was planned on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub shift: String,
    pub line: String,
    pub role: String,
    pub external: bool,
}

/// One scheduled date for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeEvent {
    pub date: String,
    pub plan_info: Option<PlanInfo>,
    pub fact: FactState,
    pub time: Option<String>,
    pub minutes: u32,
}

/// Totals for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub name: String,
    pub role: String,
    pub department: Option<String>,
    pub shifts_count: u32,
    pub rv_count: u32,
    pub error_count: u32,
    /// Total worked minutes.
    pub hours_total: u32,
    pub events: Vec<EmployeeEvent>,
}

impl EmployeeSummary {
    /// Worked time as fractional hours.
    pub fn hours(&self) -> f64 {
        f64::from(self.hours_total) / 60.0
    }
}
