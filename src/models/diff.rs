//! Plan comparison output.

use serde::{Deserialize, Serialize};

/// A (line, role) position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: String,
    pub role: String,
}

/// One worker-slot change between the master and operational plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiffEntry {
    Added {
        name: String,
        date: String,
        shift: String,
        line: String,
        role: String,
    },
    Lost {
        name: String,
        date: String,
        shift: String,
        line: String,
        role: String,
    },
    #[serde(rename_all = "camelCase")]
    Replaced {
        from_name: String,
        to_name: String,
        line: String,
        role: String,
        date: String,
        shift: String,
    },
    Moved {
        name: String,
        from: Position,
        to: Position,
        date: String,
        shift: String,
    },
}

impl DiffEntry {
    pub fn date(&self) -> &str {
        match self {
            DiffEntry::Added { date, .. }
            | DiffEntry::Lost { date, .. }
            | DiffEntry::Replaced { date, .. }
            | DiffEntry::Moved { date, .. } => date,
        }
    }

    pub fn shift(&self) -> &str {
        match self {
            DiffEntry::Added { shift, .. }
            | DiffEntry::Lost { shift, .. }
            | DiffEntry::Replaced { shift, .. }
            | DiffEntry::Moved { shift, .. } => shift,
        }
    }

    /// Name shown for the entry (the incoming worker for replacements).
    pub fn name(&self) -> &str {
        match self {
            DiffEntry::Added { name, .. } | DiffEntry::Lost { name, .. } | DiffEntry::Moved { name, .. } => name,
            DiffEntry::Replaced { to_name, .. } => to_name,
        }
    }

    /// Get the display label for the entry kind.
    pub fn kind_label(&self) -> &'static str {
        match self {
            DiffEntry::Added { .. } => "added",
            DiffEntry::Lost { .. } => "lost",
            DiffEntry::Replaced { .. } => "replaced",
            DiffEntry::Moved { .. } => "moved",
        }
    }
}
