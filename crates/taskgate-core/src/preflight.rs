//! Cost preflight gate.
//!
//! Estimates token usage with a coarse length heuristic (not a tokenizer),
//! prices the estimate on every ladder tier, and approves or rejects the plan
//! against `min(task.max_usd, hard_cap_usd)`.
//!
//! The p90/p95 figures are fixed multiples of the *mid-tier* cost regardless
//! of which model is eventually chosen. They are a conservative approximation,
//! not a percentile model, and are kept as-is for behavioral parity.

use crate::config::{EstimatorConfig, ModelPrice, PipelineConfig};
use crate::domain::{
    CostEstimate, OrchestratedPlan, PreflightReport, RecommendedCaps, Result, TaskSpec,
    TokenEstimate,
};

/// Round to 6 decimal places.
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Heuristic token estimate for `task`, clamped to its declared caps.
pub fn estimate_tokens(task: &TaskSpec, estimator: &EstimatorConfig) -> Result<TokenEstimate> {
    let skills_len = serde_json::to_string(&task.skills)?.chars().count();
    let input_chars =
        task.description.chars().count() + task.objective.chars().count() + skills_len;
    let input_base = (input_chars as f64 / estimator.chars_per_input_token).ceil() as u64;

    let criteria = task.acceptance_criteria.len() as f64;
    let output_base = ((criteria * estimator.output_tokens_per_criterion).ceil() as u64)
        .max(estimator.min_output_tokens);

    let input_tokens = input_base.min(task.budget.max_input_tokens);
    let output_tokens = output_base.min(task.budget.max_output_tokens);

    Ok(TokenEstimate {
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
    })
}

/// Price `estimate` on one ladder tier.
pub fn price_estimate(estimate: &TokenEstimate, price: &ModelPrice) -> CostEstimate {
    let input_cost_usd = round6(estimate.input_tokens as f64 / 1_000_000.0 * price.input_per_1m);
    let output_cost_usd =
        round6(estimate.output_tokens as f64 / 1_000_000.0 * price.output_per_1m);
    CostEstimate {
        model: price.model.clone(),
        input_cost_usd,
        output_cost_usd,
        total_cost_usd: round6(input_cost_usd + output_cost_usd),
    }
}

/// Run the preflight gate over a normalized plan.
pub fn run_preflight(plan: &OrchestratedPlan, config: &PipelineConfig) -> Result<PreflightReport> {
    let task = &plan.normalized_task;
    let estimator = &config.estimator;
    let estimate = estimate_tokens(task, estimator)?;

    let cost_estimates: Vec<CostEstimate> = config
        .ladder
        .tiers()
        .iter()
        .map(|price| price_estimate(&estimate, price))
        .collect();

    let baseline = price_estimate(&estimate, config.ladder.mid()).total_cost_usd;
    let p90_cost_usd = round6(baseline * estimator.p90_multiplier);
    let p95_cost_usd = round6(baseline * estimator.p95_multiplier);

    let budget_limit = task.budget.max_usd.min(config.hard_cap_usd);
    let token_limit = task
        .budget
        .max_input_tokens
        .saturating_add(task.budget.max_output_tokens);
    let within_cost = p95_cost_usd <= budget_limit;
    let within_tokens = estimate.total_tokens <= token_limit;
    let approve = within_cost && within_tokens;

    let reason = if approve {
        "Budget gate approved.".to_string()
    } else if !within_cost {
        format!("Projected p95 cost {p95_cost_usd} exceeds budget {budget_limit}.")
    } else {
        format!(
            "Estimated {} tokens exceed token caps of {}.",
            estimate.total_tokens, token_limit
        )
    };

    let headroom = |tokens: u64| (tokens as f64 * estimator.cap_headroom).ceil() as u64;
    let recommended_caps = RecommendedCaps {
        max_input_tokens: task.budget.max_input_tokens.min(headroom(estimate.input_tokens)),
        max_output_tokens: task
            .budget
            .max_output_tokens
            .min(headroom(estimate.output_tokens)),
        max_usd: budget_limit,
    };

    tracing::info!(
        event = "preflight.evaluated",
        run_id = %plan.run_id,
        input_tokens = estimate.input_tokens,
        output_tokens = estimate.output_tokens,
        p95_cost_usd = p95_cost_usd,
        budget_limit = budget_limit,
        approve = approve,
    );

    Ok(PreflightReport {
        run_id: plan.run_id.clone(),
        token_estimate: estimate,
        cost_estimates,
        p90_cost_usd,
        p95_cost_usd,
        approve,
        reason,
        recommended_caps,
        chosen_model: config.ladder.cheapest().model.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelLadder;
    use crate::domain::{Budget, RiskLevel, Skill, TaskTools, ToolAllowList};
    use crate::normalize::orchestrate;

    fn task(max_usd: f64, criteria: usize) -> TaskSpec {
        TaskSpec {
            task_id: "t".into(),
            title: "title".into(),
            description: "x".repeat(70),
            objective: "y".repeat(35),
            context: None,
            acceptance_criteria: (0..criteria).map(|i| format!("criterion {i}")).collect(),
            risk_level: RiskLevel::Low,
            budget: Budget {
                max_usd,
                max_input_tokens: 2000,
                max_output_tokens: 500,
            },
            tools: TaskTools {
                mcp: ToolAllowList { allow: vec![] },
            },
            skills: vec![],
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(0.0000004), 0.0);
        assert_eq!(round6(0.0001536), 0.000154);
        assert_eq!(round6(1.5), 1.5);
    }

    #[test]
    fn test_token_estimate_constants() {
        // (70 + 35 + len("[]")) / 3.5 = 30.57 -> 31
        let est = estimate_tokens(&task(5.0, 1), &EstimatorConfig::default()).unwrap();
        assert_eq!(est.input_tokens, 31);
        assert_eq!(est.output_tokens, 256);
        assert_eq!(est.total_tokens, 287);

        // 4 criteria * 180 = 720, clamped to max_output_tokens 500
        let est = estimate_tokens(&task(5.0, 4), &EstimatorConfig::default()).unwrap();
        assert_eq!(est.output_tokens, 500);
    }

    #[test]
    fn test_skills_json_counts_toward_input() {
        let mut t = task(5.0, 1);
        let before = estimate_tokens(&t, &EstimatorConfig::default()).unwrap();
        t.skills.push(Skill {
            skill_id: "s1".into(),
            prompt: "p".repeat(200),
            tools_allowed: vec!["search".into()],
        });
        let after = estimate_tokens(&t, &EstimatorConfig::default()).unwrap();
        assert!(after.input_tokens > before.input_tokens);
    }

    #[test]
    fn test_preflight_prices_every_tier_and_uses_mid_for_tails() {
        let config = PipelineConfig::default();
        let report = run_preflight(&orchestrate(&task(5.0, 1), "r"), &config).unwrap();

        assert_eq!(report.cost_estimates.len(), 3);
        assert_eq!(report.cost_estimates[0].total_cost_usd, 0.000159);
        assert_eq!(report.cost_estimates[1].total_cost_usd, 0.003995);
        assert!((report.p95_cost_usd - 0.006392).abs() < 1e-9);
        assert!((report.p90_cost_usd - 0.003995 * 1.3).abs() < 1e-6);
        assert!(report.approve);
        assert_eq!(report.reason, "Budget gate approved.");
        assert_eq!(report.chosen_model, "openai:gpt-4o-mini");
    }

    #[test]
    fn test_preflight_rejects_above_task_budget() {
        let report =
            run_preflight(&orchestrate(&task(0.001, 1), "r"), &PipelineConfig::default())
                .unwrap();
        assert!(!report.approve);
        assert!(report.reason.contains("exceeds budget 0.001"));
    }

    #[test]
    fn test_token_limit_saturates_at_u64_max() {
        let mut raw = task(5.0, 1);
        raw.budget.max_input_tokens = u64::MAX;
        raw.budget.max_output_tokens = u64::MAX;
        let report = run_preflight(&orchestrate(&raw, "r"), &PipelineConfig::default()).unwrap();
        assert!(report.approve);

        raw.budget.max_input_tokens = u64::MAX;
        raw.budget.max_output_tokens = 0;
        let report = run_preflight(&orchestrate(&raw, "r"), &PipelineConfig::default()).unwrap();
        assert!(report.approve);
        assert_eq!(report.token_estimate.output_tokens, 0);
    }

    #[test]
    fn test_hard_cap_tightens_declared_budget() {
        let config = PipelineConfig {
            hard_cap_usd: 0.001,
            ..PipelineConfig::default()
        };
        let report = run_preflight(&orchestrate(&task(100.0, 1), "r"), &config).unwrap();
        assert!(!report.approve);
        assert_eq!(report.recommended_caps.max_usd, 0.001);
    }

    #[test]
    fn test_recommended_caps_headroom_clamped() {
        let report =
            run_preflight(&orchestrate(&task(5.0, 4), "r"), &PipelineConfig::default()).unwrap();
        // 31 * 1.2 = 37.2 -> 38
        assert_eq!(report.recommended_caps.max_input_tokens, 38);
        // 500 * 1.2 = 600, clamped back to the declared 500
        assert_eq!(report.recommended_caps.max_output_tokens, 500);
        assert_eq!(report.recommended_caps.max_usd, 5.0);
    }

    #[test]
    fn test_single_tier_ladder_uses_it_as_baseline() {
        let config = PipelineConfig {
            ladder: ModelLadder::new(vec![ModelPrice::new("solo", 5.0, 15.0)]).unwrap(),
            ..PipelineConfig::default()
        };
        let report = run_preflight(&orchestrate(&task(5.0, 1), "r"), &config).unwrap();
        assert_eq!(report.cost_estimates.len(), 1);
        assert!((report.p95_cost_usd - 0.006392).abs() < 1e-9);
    }
}
