//! Reconciliation output models.

use serde::{Deserialize, Serialize};

/// Planned-vs-actual classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Planned and present in badge data.
    Ok,
    /// Planned, but no usable badge data.
    Missing,
    /// Present in badge data without a plan slot.
    Unexpected,
}

impl VerificationStatus {
    /// Get human-readable name for the status.
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Ok => "ok",
            VerificationStatus::Missing => "missing",
            VerificationStatus::Unexpected => "unexpected",
        }
    }
}

/// One reconciled (date, person) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub name: String,
    pub role: String,
    pub shift: Option<String>,
    pub line: Option<String>,
    pub plan: bool,
    pub fact: bool,
    pub time: Option<String>,
    pub status: VerificationStatus,
    pub department: Option<String>,
}
