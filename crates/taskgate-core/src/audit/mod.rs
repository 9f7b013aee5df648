//! Post-execution audits.
//!
//! Four independent judgments over the worker's output. All four always run;
//! an [`AuditSet`] holds exactly one report per [`AuditKind`].
//!
//! # Modules
//!
//! - [`spec`]: acceptance-criteria coverage
//! - [`quality`]: length and structure
//! - [`risk`]: risk level and secret leakage
//! - [`budget`]: hard-cap compliance and model fit

pub mod budget;
pub mod quality;
pub mod risk;
pub mod spec;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::domain::{
    AuditKind, AuditReport, AuditStatus, Budget, ExecutionPackage, PreflightReport, TaskSpec,
    WorkerOutput,
};
use crate::obs;

pub use budget::audit_budget;
pub use quality::audit_quality;
pub use risk::audit_risk;
pub use spec::audit_spec;

/// Everything the auditors may look at.
#[derive(Debug, Clone, Copy)]
pub struct AuditContext<'a> {
    /// The authoritative task (planner output).
    pub task: &'a TaskSpec,
    /// Budget as submitted, before the hard-cap clamp.
    pub declared_budget: &'a Budget,
    pub preflight: &'a PreflightReport,
    pub package: &'a ExecutionPackage,
    pub output: &'a WorkerOutput,
    pub config: &'a PipelineConfig,
}

/// Exactly one report per audit kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSet {
    pub spec: AuditReport,
    pub quality: AuditReport,
    pub risk: AuditReport,
    pub budget: AuditReport,
}

impl AuditSet {
    pub fn iter(&self) -> impl Iterator<Item = &AuditReport> {
        [&self.spec, &self.quality, &self.risk, &self.budget].into_iter()
    }

    /// Reports in spec, quality, risk, budget order.
    pub fn to_vec(&self) -> Vec<AuditReport> {
        self.iter().cloned().collect()
    }

    pub fn get(&self, kind: AuditKind) -> &AuditReport {
        match kind {
            AuditKind::Spec => &self.spec,
            AuditKind::Quality => &self.quality,
            AuditKind::Risk => &self.risk,
            AuditKind::Budget => &self.budget,
        }
    }
}

/// Run all four audits.
pub fn run_audits(ctx: &AuditContext<'_>) -> AuditSet {
    let set = AuditSet {
        spec: audit_spec(ctx.task, ctx.package, ctx.output),
        quality: audit_quality(ctx.output),
        risk: audit_risk(ctx.task, ctx.output),
        budget: audit_budget(ctx),
    };
    for report in set.iter() {
        obs::emit_audit_completed(&ctx.package.run_id, report);
    }
    set
}

pub(crate) fn report(
    audit_type: AuditKind,
    status: AuditStatus,
    score: f64,
    findings: Vec<String>,
    recommendation: &str,
) -> AuditReport {
    AuditReport {
        audit_type,
        status,
        score,
        findings,
        recommendations: vec![recommendation.to_string()],
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::config::PipelineConfig;
    use crate::domain::{
        Budget, ExecutionPackage, PreflightReport, RiskLevel, TaskSpec, TaskTools, ToolAllowList,
        WorkerOutput, WorkerStatus,
    };
    use crate::normalize::orchestrate;
    use crate::package::build_package;
    use crate::preflight::run_preflight;

    pub fn task(risk: RiskLevel, max_usd: f64, criteria: &[&str]) -> TaskSpec {
        TaskSpec {
            task_id: "t-a".into(),
            title: "Summarize incident".into(),
            description: "Summarize the outage report".into(),
            objective: "Produce a summary".into(),
            context: None,
            acceptance_criteria: criteria.iter().map(|c| c.to_string()).collect(),
            risk_level: risk,
            budget: Budget {
                max_usd,
                max_input_tokens: 2000,
                max_output_tokens: 500,
            },
            tools: TaskTools {
                mcp: ToolAllowList {
                    allow: vec!["search".into()],
                },
            },
            skills: vec![],
            metadata: Default::default(),
        }
    }

    pub fn output(content: &str) -> WorkerOutput {
        WorkerOutput {
            status: WorkerStatus::Completed,
            model_used: "openai:gpt-4o-mini".into(),
            content: content.into(),
            tool_calls: vec![],
            estimated_cost_usd: 0.0,
            failure: None,
        }
    }

    pub fn preflight_and_package(task: &TaskSpec, model: &str) -> (PreflightReport, ExecutionPackage) {
        let config = PipelineConfig::default();
        let plan = orchestrate(&task.with_budget_clamped(config.hard_cap_usd), "run-a");
        let preflight = run_preflight(&plan, &config).unwrap();
        (preflight, build_package(&plan, model))
    }
}
