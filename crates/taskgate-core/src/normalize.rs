//! Task normalizer.
//!
//! Turns a raw [`TaskSpec`] into its canonical form and binds it to a run as an
//! [`OrchestratedPlan`]. Normalization is idempotent: normalizing an already
//! normalized task changes nothing.

use std::collections::HashSet;

use chrono::Utc;

use crate::domain::{Complexity, DerivedMetrics, OrchestratedPlan, Skill, TaskSpec};

/// Canonical form of `task`.
///
/// Trims free text, drops blank acceptance criteria, and deduplicates the
/// criteria and every tool allow-list in first-occurrence order.
pub fn normalize_task(task: &TaskSpec) -> TaskSpec {
    let criteria = dedup_preserving_order(
        task.acceptance_criteria
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    );

    let mut normalized = task.clone();
    normalized.title = task.title.trim().to_string();
    normalized.description = task.description.trim().to_string();
    normalized.objective = task.objective.trim().to_string();
    normalized.context = task.context.as_ref().map(|c| c.trim().to_string());
    normalized.acceptance_criteria = criteria;
    normalized.tools.mcp.allow = dedup_preserving_order(task.allowed_tools().iter().cloned());
    normalized.skills = task
        .skills
        .iter()
        .map(|skill| Skill {
            skill_id: skill.skill_id.clone(),
            prompt: skill.prompt.trim().to_string(),
            tools_allowed: dedup_preserving_order(skill.tools_allowed.iter().cloned()),
        })
        .collect();
    normalized
}

/// Normalize `task` and bind it to `run_id`.
pub fn orchestrate(task: &TaskSpec, run_id: &str) -> OrchestratedPlan {
    let normalized_task = normalize_task(task);
    let derived = DerivedMetrics {
        estimated_complexity: Complexity::from_criteria_count(
            normalized_task.acceptance_criteria.len(),
        ),
        risk_score: normalized_task.risk_level.score(),
        objective_summary: format!("{}: {}", normalized_task.title, normalized_task.objective),
    };

    tracing::debug!(
        run_id = %run_id,
        task_id = %normalized_task.task_id,
        complexity = ?derived.estimated_complexity,
        criteria = normalized_task.acceptance_criteria.len(),
        "task normalized"
    );

    OrchestratedPlan {
        run_id: run_id.to_string(),
        created_at: Utc::now(),
        normalized_task,
        derived,
    }
}

pub(crate) fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
