//! Audit report model.

use serde::{Deserialize, Serialize};

/// Which of the four judgments produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Spec,
    Quality,
    Risk,
    Budget,
}

impl std::fmt::Display for AuditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spec => write!(f, "spec"),
            Self::Quality => write!(f, "quality"),
            Self::Risk => write!(f, "risk"),
            Self::Budget => write!(f, "budget"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditReport {
    pub audit_type: AuditKind,
    pub status: AuditStatus,
    /// Score in 0.0–1.0.
    pub score: f64,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl AuditReport {
    pub fn is_pass(&self) -> bool {
        self.status == AuditStatus::Pass
    }
}
