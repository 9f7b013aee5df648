//! Final release artifact.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Release,
    Revise,
    ManualReview,
}

/// Pass/warn/fail counts across the four audits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTally {
    pub pass: u32,
    pub warn: u32,
    pub fail: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReleaseArtifact {
    pub run_id: String,
    pub status: ReleaseStatus,
    pub next_action: NextAction,
    pub model_used: String,
    pub estimated_cost_usd: f64,
    pub audit_summary: AuditTally,
}
