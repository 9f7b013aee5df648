//! Acceptance-criteria coverage audit.

use crate::domain::{AuditKind, AuditReport, AuditStatus, ExecutionPackage, TaskSpec, WorkerOutput};

/// Leading criterion characters that must appear in the output.
const CRITERION_PREFIX_CHARS: usize = 10;

pub fn audit_spec(task: &TaskSpec, package: &ExecutionPackage, output: &WorkerOutput) -> AuditReport {
    let mut findings = Vec::new();
    let content = output.content.to_lowercase();

    if output.content.trim().is_empty() {
        findings.push("Worker output is empty.".to_string());
    }

    for criterion in &task.acceptance_criteria {
        let prefix: String = criterion
            .to_lowercase()
            .chars()
            .take(CRITERION_PREFIX_CHARS)
            .collect();
        if !content.contains(&prefix) {
            findings.push(format!("Output does not clearly reflect criterion: {criterion}"));
        }
    }

    if package.tests.is_empty() {
        findings.push("Bot package does not include acceptance tests.".to_string());
    }

    if findings.is_empty() {
        super::report(AuditKind::Spec, AuditStatus::Pass, 1.0, findings, "No spec issues found.")
    } else {
        let score = (1.0 - 0.1 * findings.len() as f64).max(0.4);
        super::report(
            AuditKind::Spec,
            AuditStatus::Warn,
            score,
            findings,
            "Revise output to explicitly satisfy each acceptance criterion.",
        )
    }
}
