//! Run entry point.
//!
//! Validates a task payload, clamps its budget to the hard cap, drives every
//! stage in order and persists the document set. Artifacts are written only
//! once every stage has succeeded. [`Pipeline::run`] never fails: errors are
//! folded into an HTTP-shaped [`RunResponse`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::audit::{run_audits, AuditContext, AuditSet};
use crate::capability::ToolRouter;
use crate::config::PipelineConfig;
use crate::domain::{
    ExecutionPackage, FinalReleaseArtifact, NextAction, OrchestratedPlan, PreflightReport,
    ReleaseStatus, Result, TaskSpec, TaskgateError, WorkerOutput,
};
use crate::escalation::{select_model, EscalationInput, ModelDecision};
use crate::metrics::METRICS;
use crate::normalize::orchestrate;
use crate::obs;
use crate::package::build_package;
use crate::planner::{plan_skills, SkillPlan};
use crate::preflight::run_preflight;
use crate::provider::LlmProvider;
use crate::release::run_release_gate;
use crate::store::{ArtifactLocator, ArtifactStore};
use crate::transport::ToolTransport;
use crate::validation::{ensure_valid, validate_as};
use crate::worker::{run_worker, WorkerInput};

/// Both escalation decisions of a run, persisted as `model_decisions.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDecisions {
    pub pre_execution: ModelDecision,
    pub post_audit: ModelDecision,
}

/// Every document a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub plan: OrchestratedPlan,
    pub skill_plan: SkillPlan,
    pub preflight: PreflightReport,
    pub package: ExecutionPackage,
    pub worker_output: WorkerOutput,
    pub audits: AuditSet,
    pub decisions: ModelDecisions,
    pub release: FinalReleaseArtifact,
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: ReleaseStatus,
    pub next_action: NextAction,
    pub final_artifact_ref: ArtifactLocator,
    pub audit_refs: Vec<ArtifactLocator>,
    pub model_used: String,
    pub estimated_cost_usd: f64,
    pub artifact_refs: BTreeMap<String, ArtifactLocator>,
}

/// Error response body. Carries no document references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Always `"error"`.
    pub status: String,
    pub run_id: String,
    pub error_kind: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResponse {
    Completed(RunSummary),
    Failed(RunFailure),
}

impl RunResponse {
    /// 200 on completion, 400 for validation errors, 500 otherwise.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Completed(_) => 200,
            Self::Failed(f) if f.error_kind == "validation_error" => 400,
            Self::Failed(_) => 500,
        }
    }

    pub fn run_id(&self) -> &str {
        match self {
            Self::Completed(s) => &s.run_id,
            Self::Failed(f) => &f.run_id,
        }
    }
}

/// Normalization and preflight only; nothing is executed or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightOutcome {
    pub plan: OrchestratedPlan,
    pub preflight: PreflightReport,
}

/// The decision pipeline with its collaborators.
pub struct Pipeline {
    config: PipelineConfig,
    provider: Arc<dyn LlmProvider>,
    transport: Arc<dyn ToolTransport>,
    store: Arc<dyn ArtifactStore>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        provider: Arc<dyn LlmProvider>,
        transport: Arc<dyn ToolTransport>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            provider,
            transport,
            store,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate `payload` and clamp its budget. Returns the declared and clamped tasks.
    fn admit(&self, payload: &serde_json::Value) -> Result<(TaskSpec, TaskSpec)> {
        let declared: TaskSpec = validate_as(payload)?;
        let clamped = declared.with_budget_clamped(self.config.hard_cap_usd);
        Ok((declared, clamped))
    }

    /// Normalize and price `payload` without running it.
    pub fn preflight(&self, payload: &serde_json::Value) -> Result<PreflightOutcome> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let _span = obs::RunSpan::enter(&run_id);
        let (_, task) = self.admit(payload)?;
        let plan = orchestrate(&task, &run_id);
        let preflight = run_preflight(&plan, &self.config)?;
        ensure_valid(&preflight)?;
        Ok(PreflightOutcome { plan, preflight })
    }

    /// Run `payload` end to end. Never fails; see [`RunResponse::http_status`].
    pub async fn run(&self, payload: &serde_json::Value) -> RunResponse {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = self
            .run_and_persist(&run_id, payload)
            .instrument(obs::run_span(&run_id))
            .await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match result {
            Ok(summary) => {
                METRICS.inc_runs_completed();
                obs::emit_run_finished(&run_id, duration_ms, true);
                RunResponse::Completed(summary)
            }
            Err(err) => {
                METRICS.inc_runs_failed();
                obs::emit_run_failed(&run_id, err.kind(), &err);
                obs::emit_run_finished(&run_id, duration_ms, false);
                RunResponse::Failed(RunFailure {
                    run_id: run_id.clone(),
                    ..RunFailure::from(&err)
                })
            }
        };
        METRICS.flush();
        response
    }

    async fn run_and_persist(&self, run_id: &str, payload: &serde_json::Value) -> Result<RunSummary> {
        let outcome = self.execute(run_id, payload).await?;
        self.persist(&outcome).await
    }

    /// Drive every stage for `payload` under `run_id`. Persists nothing
    /// except the tool trace log.
    pub async fn execute(&self, run_id: &str, payload: &serde_json::Value) -> Result<RunOutcome> {
        let config = &self.config;
        let (declared, task) = self.admit(payload)?;
        obs::emit_run_started(run_id, &declared.task_id);

        let plan = orchestrate(&task, run_id);
        let preflight = run_preflight(&plan, config)?;
        ensure_valid(&preflight)?;
        if !preflight.approve {
            METRICS.inc_budget_rejections();
        }

        let skill_plan = plan_skills(&plan, &config.ladder);
        let plan = plan.with_task(skill_plan.normalized_task.clone());

        let pre_execution = select_model(
            config,
            &EscalationInput::pre_execution(&plan, &preflight, skill_plan.preferred_model()),
        );
        obs::emit_model_selected(run_id, "pre_execution", &pre_execution.model, &pre_execution.rule.to_string());

        let package = build_package(&plan, &pre_execution.model);
        ensure_valid(&package)?;

        let trace_log = self.store.trace_log(run_id);
        let router = ToolRouter::new(
            &plan.normalized_task,
            &package,
            self.transport.as_ref(),
            trace_log.as_ref(),
            Duration::from_millis(config.worker.tool_timeout_ms),
        );
        let max_output_tokens = preflight
            .recommended_caps
            .max_output_tokens
            .min(plan.normalized_task.budget.max_output_tokens);

        let worker_output = run_worker(WorkerInput {
            task: &plan.normalized_task,
            package: &package,
            router: &router,
            provider: self.provider.as_ref(),
            config,
            max_output_tokens,
        })
        .await;

        let audits = run_audits(&AuditContext {
            task: &plan.normalized_task,
            declared_budget: &declared.budget,
            preflight: &preflight,
            package: &package,
            output: &worker_output,
            config,
        });
        for report in audits.iter() {
            ensure_valid(report)?;
        }

        let audit_list = audits.to_vec();
        let post_audit = select_model(
            config,
            &EscalationInput::post_audit(&plan, &preflight, &audit_list),
        );
        obs::emit_model_selected(run_id, "post_audit", &post_audit.model, &post_audit.rule.to_string());
        if post_audit.tier > 0 {
            METRICS.inc_escalations();
        }

        let release = run_release_gate(
            run_id,
            audits.iter(),
            &worker_output.attributed_to(&post_audit.model),
        );

        Ok(RunOutcome {
            run_id: run_id.to_string(),
            plan,
            skill_plan,
            preflight,
            package,
            worker_output,
            audits,
            decisions: ModelDecisions {
                pre_execution,
                post_audit,
            },
            release,
        })
    }

    async fn persist_one<T: Serialize>(&self, run_id: &str, name: &str, doc: &T) -> Result<ArtifactLocator> {
        let value = serde_json::to_value(doc)?;
        Ok(self.store.persist(run_id, name, &value).await?)
    }

    /// Persist the document set of a completed run.
    pub async fn persist(&self, outcome: &RunOutcome) -> Result<RunSummary> {
        let run_id = outcome.run_id.as_str();
        let mut refs = BTreeMap::new();

        refs.insert(
            "task_spec".to_string(),
            self.persist_one(run_id, "task_spec.json", &outcome.plan.normalized_task).await?,
        );
        refs.insert(
            "super_agent".to_string(),
            self.persist_one(run_id, "super_agent.json", &outcome.skill_plan).await?,
        );
        refs.insert(
            "preflight".to_string(),
            self.persist_one(run_id, "preflight_report.json", &outcome.preflight).await?,
        );
        refs.insert(
            "bot_package".to_string(),
            self.persist_one(run_id, "bot_package.json", &outcome.package).await?,
        );
        refs.insert(
            "worker_output".to_string(),
            self.persist_one(run_id, "worker_output.json", &outcome.worker_output).await?,
        );
        refs.insert(
            "model_decisions".to_string(),
            self.persist_one(run_id, "model_decisions.json", &outcome.decisions).await?,
        );
        let audits_ref = self
            .persist_one(run_id, "audit_reports.json", &outcome.audits.to_vec())
            .await?;
        let final_ref = self
            .persist_one(run_id, "final_release.json", &outcome.release)
            .await?;

        Ok(RunSummary {
            run_id: run_id.to_string(),
            status: outcome.release.status,
            next_action: outcome.release.next_action,
            final_artifact_ref: final_ref,
            audit_refs: vec![audits_ref],
            model_used: outcome.release.model_used.clone(),
            estimated_cost_usd: outcome.worker_output.estimated_cost_usd,
            artifact_refs: refs,
        })
    }
}

impl From<&TaskgateError> for RunFailure {
    fn from(err: &TaskgateError) -> Self {
        Self {
            status: "error".to_string(),
            run_id: String::new(),
            error_kind: err.kind().to_string(),
            error: err.to_string(),
        }
    }
}
