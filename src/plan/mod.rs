//! Plan snapshots: roster parsing, slot expansion and comparison.

mod diff;
mod roster;
mod slots;

pub use diff::diff_plans;
pub use roster::split_roster;
pub use slots::{assign_home_lines, slot_id};
