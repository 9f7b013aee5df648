//! Risk-level and secret-leakage audit.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{AuditKind, AuditReport, AuditStatus, RiskLevel, TaskSpec, WorkerOutput};

const SECRET_PATTERNS: [&str; 4] = [
    r"(?i)api[_-]?key",
    r"(?i)password",
    r"(?i)secret",
    r"(?i)token\s*[:=]",
];

fn secret_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SECRET_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Whether `content` looks like it leaks a credential.
pub fn contains_secret(content: &str) -> bool {
    secret_patterns().iter().any(|re| re.is_match(content))
}

pub fn audit_risk(task: &TaskSpec, output: &WorkerOutput) -> AuditReport {
    let mut findings = Vec::new();

    if task.risk_level == RiskLevel::High {
        findings.push("High-risk task requires manual review before release.".to_string());
    }

    let leaked = contains_secret(&output.content);
    if leaked {
        findings.push("Potential secret leakage detected in worker output.".to_string());
    }

    let (status, score) = if leaked {
        (AuditStatus::Fail, 0.2)
    } else if !findings.is_empty() {
        (AuditStatus::Warn, 0.6)
    } else {
        (AuditStatus::Pass, 0.95)
    };

    let recommendation = if status == AuditStatus::Pass {
        "No immediate risk findings."
    } else {
        "Remove sensitive content and require human approval for high-risk tasks."
    };
    super::report(AuditKind::Risk, status, score, findings, recommendation)
}
