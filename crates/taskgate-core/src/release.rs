//! Release gate.
//!
//! A pure function of the audit tally:
//!
//! | tally                | status | next action     |
//! |----------------------|--------|-----------------|
//! | any fail             | fail   | `manual_review` |
//! | no fail, warn > 1    | pass   | `revise`        |
//! | otherwise            | pass   | `release`       |

use crate::domain::{
    AuditReport, AuditStatus, AuditTally, FinalReleaseArtifact, NextAction, ReleaseStatus,
    WorkerOutput,
};
use crate::obs;

/// Count pass/warn/fail across `audits`.
pub fn tally<'a>(audits: impl IntoIterator<Item = &'a AuditReport>) -> AuditTally {
    audits
        .into_iter()
        .fold(AuditTally::default(), |mut acc, audit| {
            match audit.status {
                AuditStatus::Pass => acc.pass += 1,
                AuditStatus::Warn => acc.warn += 1,
                AuditStatus::Fail => acc.fail += 1,
            }
            acc
        })
}

/// Status and next action for `summary`.
pub fn decide(summary: &AuditTally) -> (ReleaseStatus, NextAction) {
    if summary.fail > 0 {
        (ReleaseStatus::Fail, NextAction::ManualReview)
    } else if summary.warn > 1 {
        (ReleaseStatus::Pass, NextAction::Revise)
    } else {
        (ReleaseStatus::Pass, NextAction::Release)
    }
}

/// Render the final release artifact.
///
/// `output.model_used` should already carry the post-audit model decision.
pub fn run_release_gate<'a>(
    run_id: &str,
    audits: impl IntoIterator<Item = &'a AuditReport>,
    output: &WorkerOutput,
) -> FinalReleaseArtifact {
    let audit_summary = tally(audits);
    let (status, next_action) = decide(&audit_summary);

    let release = FinalReleaseArtifact {
        run_id: run_id.to_string(),
        status,
        next_action,
        model_used: output.model_used.clone(),
        estimated_cost_usd: output.estimated_cost_usd,
        audit_summary,
    };
    obs::emit_release_decided(&release);
    release
}
