//! Model escalation policy.
//!
//! One pure decision function, called twice per run: before execution with
//! the planner's preferred model as override and no audits, and after
//! auditing with the audits and no override.
//!
//! Rules, first match wins:
//! 1. an override naming a ladder member
//! 2. preflight not approved → cheapest
//! 3. any audit `fail`, a non-passing risk audit, or high risk → premium
//! 4. medium risk or p95 above the configured threshold → mid
//! 5. cheapest

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::domain::{AuditKind, AuditReport, AuditStatus, OrchestratedPlan, PreflightReport, RiskLevel};

/// Snapshot the policy decides over.
#[derive(Debug, Clone, Copy)]
pub struct EscalationInput<'a> {
    pub plan: &'a OrchestratedPlan,
    pub preflight: &'a PreflightReport,
    pub audits: &'a [AuditReport],
    pub preferred_model: Option<&'a str>,
}

impl<'a> EscalationInput<'a> {
    /// Pre-execution snapshot: no audits yet.
    pub fn pre_execution(
        plan: &'a OrchestratedPlan,
        preflight: &'a PreflightReport,
        preferred_model: Option<&'a str>,
    ) -> Self {
        Self {
            plan,
            preflight,
            audits: &[],
            preferred_model,
        }
    }

    /// Post-audit snapshot: no override.
    pub fn post_audit(
        plan: &'a OrchestratedPlan,
        preflight: &'a PreflightReport,
        audits: &'a [AuditReport],
    ) -> Self {
        Self {
            plan,
            preflight,
            audits,
            preferred_model: None,
        }
    }
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRule {
    Override,
    BudgetRejected,
    Premium,
    Mid,
    Default,
}

impl std::fmt::Display for EscalationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::BudgetRejected => write!(f, "budget_rejected"),
            Self::Premium => write!(f, "premium"),
            Self::Mid => write!(f, "mid"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDecision {
    pub model: String,
    /// Ladder index of `model`.
    pub tier: usize,
    pub rule: EscalationRule,
}

/// Pick the model tier for `input`. Deterministic and total.
pub fn select_model(config: &PipelineConfig, input: &EscalationInput<'_>) -> ModelDecision {
    let ladder = &config.ladder;
    let mid = ladder.len().saturating_sub(1).min(1);
    let premium = ladder.len().saturating_sub(1);
    let decide = |tier: usize, rule: EscalationRule| ModelDecision {
        model: ladder.tier(tier).model.clone(),
        tier,
        rule,
    };

    if let Some(tier) = input.preferred_model.and_then(|model| ladder.position(model)) {
        return decide(tier, EscalationRule::Override);
    }

    if !input.preflight.approve {
        return decide(0, EscalationRule::BudgetRejected);
    }

    let risk = input.plan.normalized_task.risk_level;
    let any_fail = input.audits.iter().any(|a| a.status == AuditStatus::Fail);
    let risk_flagged = input
        .audits
        .iter()
        .any(|a| a.audit_type == AuditKind::Risk && a.status != AuditStatus::Pass);

    if any_fail || risk_flagged || risk == RiskLevel::High {
        return decide(premium, EscalationRule::Premium);
    }

    if risk == RiskLevel::Medium
        || input.preflight.p95_cost_usd > config.escalation_p95_threshold_usd
    {
        return decide(mid, EscalationRule::Mid);
    }

    decide(0, EscalationRule::Default)
}
