//! Reconciliation of planned assignments with badge attendance.

mod department;
mod engine;

pub use department::DepartmentIndex;
pub use engine::{UNKNOWN_ROLE, reconcile_date, verify_date};
