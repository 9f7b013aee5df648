//! Output length and structure audit.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{AuditKind, AuditReport, AuditStatus, WorkerOutput};

const MIN_CONTENT_CHARS: usize = 60;

/// Newline, hyphen or a numbered-list marker.
fn structure_marker() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| Regex::new(r"\n|-|\d+\.").ok())
        .as_ref()
}

pub fn audit_quality(output: &WorkerOutput) -> AuditReport {
    let mut findings = Vec::new();

    if output.content.chars().count() < MIN_CONTENT_CHARS {
        findings.push("Output is likely too brief for production usage.".to_string());
    }

    let structured = structure_marker().is_some_and(|re| re.is_match(&output.content));
    if !structured {
        findings.push("Output structure may be hard to read.".to_string());
    }

    if findings.is_empty() {
        super::report(AuditKind::Quality, AuditStatus::Pass, 0.95, findings, "Quality is acceptable.")
    } else {
        super::report(
            AuditKind::Quality,
            AuditStatus::Warn,
            0.7,
            findings,
            "Improve structure and readability with headings or bullets.",
        )
    }
}
