//! Structured observability hooks for the run lifecycle.
//!
//! - Run-scoped tracing spans via the [`RunSpan`] RAII guard
//! - Emission functions for stage boundaries: start, model selection, tool
//!   authorization, audit completion, release decision, finish
//!
//! Events are emitted at `info!` level; filter with `RUST_LOG`.

use tracing::info;

use crate::domain::{AuditReport, FinalReleaseArtifact};

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// ```ignore
/// let _span = RunSpan::enter("run-12345");
/// // every event below now carries run_id = "run-12345"
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// The run-scoped span, for instrumenting futures that cross await points.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("taskgate.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, task_id: &str) {
    info!(event = "run.started", run_id = %run_id, task_id = %task_id);
}

/// Emit event: a model decision was made. `phase` is `pre_execution` or `post_audit`.
pub fn emit_model_selected(run_id: &str, phase: &str, model: &str, rule: &str) {
    info!(
        event = "model.selected",
        run_id = %run_id,
        phase = %phase,
        model = %model,
        rule = %rule,
    );
}

pub fn emit_tool_authorized(skill_id: &str, tool: &str, server_id: &str) {
    info!(
        event = "tool.authorized",
        skill_id = %skill_id,
        tool = %tool,
        server_id = %server_id,
    );
}

/// Emit event: tool call denied (warning level).
pub fn emit_tool_denied(skill_id: &str, tool: &str, reason: &str) {
    tracing::warn!(
        event = "tool.denied",
        skill_id = %skill_id,
        tool = %tool,
        reason = %reason,
    );
}

pub fn emit_audit_completed(run_id: &str, report: &AuditReport) {
    info!(
        event = "audit.completed",
        run_id = %run_id,
        audit_type = %report.audit_type,
        status = %report.status,
        score = report.score,
        findings = report.findings.len(),
    );
}

pub fn emit_release_decided(release: &FinalReleaseArtifact) {
    info!(
        event = "release.decided",
        run_id = %release.run_id,
        status = ?release.status,
        next_action = ?release.next_action,
        pass = release.audit_summary.pass,
        warn = release.audit_summary.warn,
        fail = release.audit_summary.fail,
    );
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: run aborted before completion (warning level).
pub fn emit_run_failed(run_id: &str, error_kind: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(
        event = "run.failed",
        run_id = %run_id,
        error_kind = %error_kind,
        error = %error,
    );
}
