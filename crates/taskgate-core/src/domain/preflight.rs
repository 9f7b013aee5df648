//! Preflight cost report.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEstimate {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Projected cost of the estimate on one ladder tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostEstimate {
    pub model: String,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

/// Tightened caps suggested for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendedCaps {
    pub max_input_tokens: u64,
    pub max_output_tokens: u64,
    pub max_usd: f64,
}

/// Output of the cost preflight gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreflightReport {
    pub run_id: String,
    pub token_estimate: TokenEstimate,
    pub cost_estimates: Vec<CostEstimate>,
    /// Fixed multiple of the mid-tier cost; not a statistical percentile.
    pub p90_cost_usd: f64,
    /// Fixed multiple of the mid-tier cost; not a statistical percentile.
    pub p95_cost_usd: f64,
    pub approve: bool,
    pub reason: String,
    pub recommended_caps: RecommendedCaps,
    pub chosen_model: String,
}
