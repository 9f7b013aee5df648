//! Normalized plan produced by the task normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::TaskSpec;

/// Coarse size bucket derived from the acceptance-criteria count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Small,
    Medium,
    Large,
}

impl Complexity {
    pub fn from_criteria_count(count: usize) -> Self {
        if count > 5 {
            Self::Large
        } else if count > 2 {
            Self::Medium
        } else {
            Self::Small
        }
    }
}

/// Advisory metrics. Nothing downstream feeds these into the budget decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub estimated_complexity: Complexity,
    pub risk_score: f64,
    pub objective_summary: String,
}

/// A normalized task bound to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratedPlan {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub normalized_task: TaskSpec,
    pub derived: DerivedMetrics,
}

impl OrchestratedPlan {
    /// Derive a plan that carries `task` in place of the current normalized task.
    ///
    /// Used once the skill planner has fixed the authoritative skill list.
    pub fn with_task(&self, task: TaskSpec) -> Self {
        Self {
            run_id: self.run_id.clone(),
            created_at: self.created_at,
            normalized_task: task,
            derived: self.derived.clone(),
        }
    }
}
