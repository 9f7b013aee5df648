//! Hard-cap compliance and model-fit audit.

use crate::domain::{AuditKind, AuditReport, AuditStatus, RiskLevel};

use super::AuditContext;

pub fn audit_budget(ctx: &AuditContext<'_>) -> AuditReport {
    let cap = ctx.config.hard_cap_usd;
    let mut breached = false;
    let mut findings = Vec::new();

    if ctx.declared_budget.max_usd > cap {
        breached = true;
        findings.push(format!("Task budget exceeds hard cap of ${cap}."));
    }

    if ctx.preflight.recommended_caps.max_usd > cap {
        breached = true;
        findings.push("Preflight recommended cap exceeds hard cap.".to_string());
    }

    if ctx.task.risk_level == RiskLevel::High
        && ctx.package.model == ctx.config.ladder.cheapest().model
    {
        findings.push("Model may be underpowered for high-risk task.".to_string());
    }

    let (status, score) = if breached {
        (AuditStatus::Fail, 0.3)
    } else if !findings.is_empty() {
        (AuditStatus::Warn, 0.7)
    } else {
        (AuditStatus::Pass, 1.0)
    };

    let recommendation = if status == AuditStatus::Pass {
        "Budget and model fit checks passed."
    } else {
        "Lower token caps and/or escalate model according to task risk profile."
    };
    super::report(AuditKind::Budget, status, score, findings, recommendation)
}
