//! Table-driven sweeps over the pure decision functions.

use taskgate_core::capability::{allowed_for_skill, package_scope};
use taskgate_core::release::{decide, tally};
use taskgate_core::{
    build_package, normalize_task, orchestrate, run_preflight, select_model, AuditKind,
    AuditReport, AuditStatus, Budget, EscalationInput, EscalationRule, NextAction,
    PipelineConfig, ReleaseStatus, RiskLevel, Skill, TaskSpec,
};
use taskgate_core::domain::{TaskTools, ToolAllowList};

const RISKS: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
const STATUSES: [AuditStatus; 3] = [AuditStatus::Pass, AuditStatus::Warn, AuditStatus::Fail];
const KINDS: [AuditKind; 4] = [
    AuditKind::Spec,
    AuditKind::Quality,
    AuditKind::Risk,
    AuditKind::Budget,
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn skill(id: &str, tools: &[&str]) -> Skill {
    Skill {
        skill_id: id.into(),
        prompt: format!("  use {id}  "),
        tools_allowed: strings(tools),
    }
}

fn task(risk: RiskLevel, max_usd: f64, allow: &[&str], skills: Vec<Skill>) -> TaskSpec {
    TaskSpec {
        task_id: "prop-1".into(),
        title: "  Review change  ".into(),
        description: "Review the proposed configuration change".into(),
        objective: " Decide whether it is safe ".into(),
        context: Some("  staging only ".into()),
        acceptance_criteria: strings(&["lists risks", " ", "lists risks", "names owner"]),
        risk_level: risk,
        budget: Budget {
            max_usd,
            max_input_tokens: 4000,
            max_output_tokens: 1000,
        },
        tools: TaskTools {
            mcp: ToolAllowList {
                allow: strings(allow),
            },
        },
        skills,
        metadata: Default::default(),
    }
}

fn audit(kind: AuditKind, status: AuditStatus) -> AuditReport {
    AuditReport {
        audit_type: kind,
        status,
        score: 0.5,
        findings: vec![],
        recommendations: vec![],
    }
}

#[test]
fn normalization_is_idempotent() {
    for risk in RISKS {
        let raw = task(
            risk,
            2.0,
            &["search", "write", "search"],
            vec![skill("s1", &["write", "search", "write"])],
        );
        let once = normalize_task(&raw);
        let twice = normalize_task(&once);
        assert_eq!(once, twice);
        assert_eq!(once.acceptance_criteria, strings(&["lists risks", "names owner"]));
        assert_eq!(once.tools.mcp.allow, strings(&["search", "write"]));
    }
}

#[test]
fn capability_resolution_is_monotonic_under_removal() {
    let full = ["search", "write", "fetch", "delete"];
    let base = task(
        RiskLevel::Low,
        1.0,
        &full,
        vec![skill("s1", &full), skill("s2", &["search", "write", "fetch"])],
    );
    let plan = orchestrate(&base, "run-mono");
    let package = build_package(&plan, "openai:gpt-4o-mini");
    let before = allowed_for_skill(&plan.normalized_task, &package, "s1");

    for removed in full {
        // Removing a tool from the task allow-list.
        let mut narrowed = plan.normalized_task.clone();
        narrowed.tools.mcp.allow.retain(|t| t != removed);
        let after = allowed_for_skill(&narrowed, &package, "s1");
        assert!(after.iter().all(|t| before.contains(t)), "task removal of {removed}");
        assert!(!after.iter().any(|t| t == removed));

        // Removing a tool from the skill allow-list.
        let mut narrowed = plan.normalized_task.clone();
        narrowed.skills[0].tools_allowed.retain(|t| t != removed);
        let after = allowed_for_skill(&narrowed, &package, "s1");
        assert!(after.iter().all(|t| before.contains(t)), "skill removal of {removed}");

        // Removing a tool from the package scope.
        let mut narrowed_package = package.clone();
        narrowed_package.tools.mcp_scope.allow.retain(|t| t != removed);
        let after = allowed_for_skill(&plan.normalized_task, &narrowed_package, "s1");
        assert!(after.iter().all(|t| before.contains(t)), "package removal of {removed}");
    }
}

#[test]
fn package_scope_never_exceeds_task_allow_list() {
    let task_allow = strings(&["search", "write"]);
    let cases = [
        vec![],
        vec![skill("s1", &["search"])],
        vec![skill("s1", &["search", "write", "admin"])],
        vec![skill("s1", &["admin"])],
        vec![skill("s1", &["search", "write"]), skill("s2", &["write"])],
    ];
    for skills in cases {
        let scope = package_scope(&task_allow, &skills);
        assert!(scope.iter().all(|t| task_allow.contains(t)), "{skills:?}");
    }
}

#[test]
fn escalation_is_total_and_deterministic() {
    let config = PipelineConfig::default();
    let ladder = &config.ladder;

    for risk in RISKS {
        let plan = orchestrate(&task(risk, 2.0, &["search"], vec![]), "run-esc");
        let approved = run_preflight(&plan, &config).unwrap();
        for approve in [true, false] {
            let mut preflight = approved.clone();
            preflight.approve = approve;

            for &spec in &STATUSES {
                for &quality in &STATUSES {
                    for &risk_status in &STATUSES {
                        for &budget in &STATUSES {
                            let audits = vec![
                                audit(AuditKind::Spec, spec),
                                audit(AuditKind::Quality, quality),
                                audit(AuditKind::Risk, risk_status),
                                audit(AuditKind::Budget, budget),
                            ];
                            let input = EscalationInput::post_audit(&plan, &preflight, &audits);
                            let first = select_model(&config, &input);
                            let second = select_model(&config, &input);
                            assert_eq!(first, second);
                            assert!(ladder.contains(&first.model));
                            assert_eq!(ladder.position(&first.model), Some(first.tier));

                            let any_fail = audits.iter().any(|a| a.status == AuditStatus::Fail);
                            let expected = if !approve {
                                EscalationRule::BudgetRejected
                            } else if any_fail
                                || risk_status != AuditStatus::Pass
                                || risk == RiskLevel::High
                            {
                                EscalationRule::Premium
                            } else if risk == RiskLevel::Medium {
                                EscalationRule::Mid
                            } else {
                                EscalationRule::Default
                            };
                            assert_eq!(first.rule, expected);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn valid_override_always_wins() {
    let config = PipelineConfig::default();
    for risk in RISKS {
        let plan = orchestrate(&task(risk, 2.0, &["search"], vec![]), "run-ovr");
        let mut preflight = run_preflight(&plan, &config).unwrap();
        for approve in [true, false] {
            preflight.approve = approve;
            for (tier, price) in config.ladder.tiers().iter().enumerate() {
                let input = EscalationInput::pre_execution(&plan, &preflight, Some(&price.model));
                let decision = select_model(&config, &input);
                assert_eq!(decision.rule, EscalationRule::Override);
                assert_eq!(decision.tier, tier);
            }
            // Unknown override falls through to the regular rules.
            let input = EscalationInput::pre_execution(&plan, &preflight, Some("openai:unknown"));
            assert_ne!(select_model(&config, &input).rule, EscalationRule::Override);
        }
    }
}

#[test]
fn release_gate_is_pure_function_of_tally() {
    // Every status assignment of the four audits.
    for &a in &STATUSES {
        for &b in &STATUSES {
            for &c in &STATUSES {
                for &d in &STATUSES {
                    let audits: Vec<_> = KINDS
                        .iter()
                        .zip([a, b, c, d])
                        .map(|(&kind, status)| audit(kind, status))
                        .collect();
                    let summary = tally(&audits);
                    assert_eq!(summary.pass + summary.warn + summary.fail, 4);

                    let (status, action) = decide(&summary);
                    if summary.fail >= 1 {
                        assert_eq!((status, action), (ReleaseStatus::Fail, NextAction::ManualReview));
                    } else if summary.warn > 1 {
                        assert_eq!((status, action), (ReleaseStatus::Pass, NextAction::Revise));
                    } else {
                        assert_eq!((status, action), (ReleaseStatus::Pass, NextAction::Release));
                    }

                    // Order of audits does not matter.
                    let reversed: Vec<_> = audits.iter().rev().cloned().collect();
                    assert_eq!(decide(&tally(&reversed)), (status, action));
                }
            }
        }
    }
}

#[test]
fn budget_gate_never_approves_over_limit() {
    let config = PipelineConfig::default();
    let budgets = [0.0, 0.0001, 0.001, 0.01, 0.1, 1.0, 5.0, 10.0, 1000.0];
    for risk in RISKS {
        for max_usd in budgets {
            let raw = task(risk, max_usd, &["search"], vec![]);
            let plan = orchestrate(&raw.with_budget_clamped(config.hard_cap_usd), "run-budget");
            let report = run_preflight(&plan, &config).unwrap();
            let limit = max_usd.min(config.hard_cap_usd);
            if report.p95_cost_usd > limit {
                assert!(!report.approve, "approved p95 {} over {limit}", report.p95_cost_usd);
            }
            assert!(report.recommended_caps.max_usd <= config.hard_cap_usd);
            assert!(report.p90_cost_usd <= report.p95_cost_usd);
        }
    }
}
