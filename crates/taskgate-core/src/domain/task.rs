//! Task request model: the declarative input to a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared risk of a task.
///
/// Drives the preferred model tier, the escalation policy and the risk audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fixed advisory score for this level.
    pub fn score(self) -> f64 {
        match self {
            Self::Low => 0.3,
            Self::Medium => 0.6,
            Self::High => 0.9,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Spend and token ceilings declared by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Budget {
    pub max_usd: f64,
    pub max_input_tokens: u64,
    pub max_output_tokens: u64,
}

/// Tool allow-list for one tool namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolAllowList {
    pub allow: Vec<String>,
}

/// Task-level tool section (`tools.mcp.allow` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskTools {
    pub mcp: ToolAllowList,
}

/// A named capability bundle the worker executes under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Skill {
    pub skill_id: String,
    pub prompt: String,
    pub tools_allowed: Vec<String>,
}

/// A task request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub objective: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub acceptance_criteria: Vec<String>,
    pub risk_level: RiskLevel,
    pub budget: Budget,
    pub tools: TaskTools,
    pub skills: Vec<Skill>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl TaskSpec {
    /// Task-level tool allow-list.
    pub fn allowed_tools(&self) -> &[String] {
        &self.tools.mcp.allow
    }

    /// Look up a skill by id.
    pub fn skill(&self, skill_id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.skill_id == skill_id)
    }

    /// Copy of this task with its declared `max_usd` clamped to `cap`.
    ///
    /// The cap can only tighten the declared budget, never loosen it.
    pub fn with_budget_clamped(&self, cap: f64) -> Self {
        let mut task = self.clone();
        task.budget.max_usd = task.budget.max_usd.min(cap);
        task
    }
}
