//! Data models for workers, attendance, plans and engine output.

pub mod attendance;
pub mod diff;
pub mod plan;
pub mod summary;
pub mod verification;
pub mod worker;

pub use attendance::{AttendanceDataset, AttendanceRecord, DayAttendance, FactState, validate_fact_entry};
pub use diff::{DiffEntry, Position};
pub use plan::{AssignmentKind, LinePosition, ManualAssignment, PlanSnapshot, PlannedAssignment, RawTables, SlotStatus};
pub use summary::{EmployeeEvent, EmployeeSummary, PlanInfo};
pub use verification::{VerificationRecord, VerificationStatus};
pub use worker::{EmploymentState, Registry, UNSPECIFIED_ROLE, Worker, WorkerStatus};
