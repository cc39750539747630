//! Badge export import and attendance timeline building.

mod builder;
mod cell;
mod import;
mod loader;

pub use builder::build_person_events;
pub use cell::{Cell, CellTimes, parse_cell};
pub use import::{BadgeExport, BadgePerson, DEFAULT_SKIP_VALUE, scan_badge_grid};
pub use loader::{load_csv, parse_csv};
