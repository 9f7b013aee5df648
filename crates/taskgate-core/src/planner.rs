//! Skill assignment planner.
//!
//! Drafts the single execution bot for a run: which skills it carries and
//! which model tier it would prefer given the task's risk level. The task it
//! returns, with exactly the assigned skills substituted in, is authoritative
//! for every later stage.

use serde::{Deserialize, Serialize};

use crate::config::ModelLadder;
use crate::domain::{OrchestratedPlan, RiskLevel, Skill, TaskSpec};

/// Id of the skill assigned when a task declares none.
pub const FALLBACK_SKILL_ID: &str = "general-planner";
const FALLBACK_PROMPT: &str = "Plan, execute, and validate output against acceptance criteria.";
const FALLBACK_REASON: &str =
    "auto-assigned fallback skill because no explicit skills were provided";
const PROVIDED_REASON: &str = "provided by specification";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAssignment {
    pub skill_id: String,
    pub reason: String,
    pub tools_allowed: Vec<String>,
    pub prompt: String,
}

impl SkillAssignment {
    fn to_skill(&self) -> Skill {
        Skill {
            skill_id: self.skill_id.clone(),
            prompt: self.prompt.clone(),
            tools_allowed: self.tools_allowed.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotDraft {
    pub bot_id: String,
    pub bot_name: String,
    pub purpose: String,
    pub preferred_model: String,
    pub assigned_skills: Vec<SkillAssignment>,
}

/// Planner output, persisted as `super_agent.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPlan {
    pub run_id: String,
    pub selected_bot_id: String,
    pub bot_drafts: Vec<BotDraft>,
    pub normalized_task: TaskSpec,
}

impl SkillPlan {
    /// The selected bot's preferred model.
    pub fn preferred_model(&self) -> Option<&str> {
        self.bot_drafts
            .iter()
            .find(|draft| draft.bot_id == self.selected_bot_id)
            .map(|draft| draft.preferred_model.as_str())
    }
}

/// Ladder tier a bot prefers for `risk`: cheapest, mid or premium.
pub fn preferred_tier(risk: RiskLevel) -> usize {
    match risk {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
    }
}

fn assign_skills(task: &TaskSpec) -> Vec<SkillAssignment> {
    if task.skills.is_empty() {
        return vec![SkillAssignment {
            skill_id: FALLBACK_SKILL_ID.to_string(),
            reason: FALLBACK_REASON.to_string(),
            tools_allowed: task.allowed_tools().to_vec(),
            prompt: FALLBACK_PROMPT.to_string(),
        }];
    }
    task.skills
        .iter()
        .map(|skill| SkillAssignment {
            skill_id: skill.skill_id.clone(),
            reason: PROVIDED_REASON.to_string(),
            tools_allowed: skill.tools_allowed.clone(),
            prompt: skill.prompt.clone(),
        })
        .collect()
}

/// Draft the execution bot for `plan`.
pub fn plan_skills(plan: &OrchestratedPlan, ladder: &ModelLadder) -> SkillPlan {
    let task = &plan.normalized_task;
    let assigned_skills = assign_skills(task);
    let preferred_model = ladder.tier(preferred_tier(task.risk_level)).model.clone();

    let draft = BotDraft {
        bot_id: format!("{}-primary-bot", plan.run_id),
        bot_name: "primary-execution-bot".to_string(),
        purpose: format!(
            "Complete task {} with assigned skills and strict tool boundaries.",
            task.task_id
        ),
        preferred_model,
        assigned_skills,
    };

    let mut normalized_task = task.clone();
    normalized_task.skills = draft.assigned_skills.iter().map(SkillAssignment::to_skill).collect();

    tracing::debug!(
        run_id = %plan.run_id,
        bot_id = %draft.bot_id,
        skills = draft.assigned_skills.len(),
        preferred_model = %draft.preferred_model,
        "skills assigned"
    );

    SkillPlan {
        run_id: plan.run_id.clone(),
        selected_bot_id: draft.bot_id.clone(),
        bot_drafts: vec![draft],
        normalized_task,
    }
}
