//! Pipeline configuration.
//!
//! The model ladder, pricing table, hard budget cap and heuristic constants
//! are process-wide values. They are carried in an immutable
//! [`PipelineConfig`] that the preflight gate, escalation policy, auditors and
//! worker all receive explicitly, so alternate ladders can be exercised in
//! tests without touching global state.
//!
//! Sources, in increasing precedence: built-in defaults, an optional TOML
//! file, and `TASKGATE_*` environment variables.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`PipelineConfig::hard_cap_usd`].
pub const ENV_HARD_CAP_USD: &str = "TASKGATE_HARD_CAP_USD";
/// Environment variable overriding [`PipelineConfig::escalation_p95_threshold_usd`].
pub const ENV_P95_THRESHOLD_USD: &str = "TASKGATE_P95_THRESHOLD_USD";
/// Environment variable overriding [`WorkerSettings::tool_timeout_ms`].
pub const ENV_TOOL_TIMEOUT_MS: &str = "TASKGATE_TOOL_TIMEOUT_MS";
/// Environment variable overriding [`WorkerSettings::completion_timeout_ms`].
pub const ENV_COMPLETION_TIMEOUT_MS: &str = "TASKGATE_COMPLETION_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Per-million-token pricing for one selectable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub model: String,
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

impl ModelPrice {
    pub fn new(model: impl Into<String>, input_per_1m: f64, output_per_1m: f64) -> Self {
        Self {
            model: model.into(),
            input_per_1m,
            output_per_1m,
        }
    }
}

/// Ordered list of selectable models, cheapest first.
///
/// Always non-empty with unique model ids; deserialization enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ModelPrice>", into = "Vec<ModelPrice>")]
pub struct ModelLadder {
    tiers: Vec<ModelPrice>,
}

impl ModelLadder {
    pub fn new(tiers: Vec<ModelPrice>) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::Invalid("model ladder must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for tier in &tiers {
            if tier.model.trim().is_empty() {
                return Err(ConfigError::Invalid("model id must not be empty".into()));
            }
            if !seen.insert(tier.model.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate model in ladder: {}",
                    tier.model
                )));
            }
            if tier.input_per_1m < 0.0 || tier.output_per_1m < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "negative price for model {}",
                    tier.model
                )));
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[ModelPrice] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tier 0.
    pub fn cheapest(&self) -> &ModelPrice {
        &self.tiers[0]
    }

    /// Tier 1, or the only tier of a single-entry ladder.
    pub fn mid(&self) -> &ModelPrice {
        self.tier(1)
    }

    /// The last tier.
    pub fn premium(&self) -> &ModelPrice {
        &self.tiers[self.tiers.len() - 1]
    }

    /// Tier at `index`, clamped to the top of the ladder.
    pub fn tier(&self, index: usize) -> &ModelPrice {
        &self.tiers[index.min(self.tiers.len() - 1)]
    }

    pub fn position(&self, model: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.model == model)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.position(model).is_some()
    }

    pub fn price_of(&self, model: &str) -> Option<&ModelPrice> {
        self.tiers.iter().find(|t| t.model == model)
    }
}

impl Default for ModelLadder {
    fn default() -> Self {
        Self {
            tiers: vec![
                ModelPrice::new("openai:gpt-4o-mini", 0.15, 0.6),
                ModelPrice::new("openai:gpt-4o", 5.0, 15.0),
                ModelPrice::new("openai:gpt-5", 10.0, 30.0),
            ],
        }
    }
}

impl TryFrom<Vec<ModelPrice>> for ModelLadder {
    type Error = ConfigError;

    fn try_from(tiers: Vec<ModelPrice>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<ModelLadder> for Vec<ModelPrice> {
    fn from(ladder: ModelLadder) -> Self {
        ladder.tiers
    }
}

/// Constants of the length-to-token heuristic used by the preflight gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub chars_per_input_token: f64,
    pub output_tokens_per_criterion: f64,
    pub min_output_tokens: u64,
    /// Multiplier applied to estimates when recommending caps.
    pub cap_headroom: f64,
    pub p90_multiplier: f64,
    pub p95_multiplier: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            chars_per_input_token: 3.5,
            output_tokens_per_criterion: 180.0,
            min_output_tokens: 256,
            cap_headroom: 1.2,
            p90_multiplier: 1.3,
            p95_multiplier: 1.6,
        }
    }
}

/// Bounds applied to the completion ceiling passed to the model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionLimits {
    pub min_output_tokens: u64,
    pub max_output_tokens: u64,
    pub default_output_tokens: u64,
}

impl CompletionLimits {
    /// Clamp a requested ceiling into `[min, max]`; `None` uses the default.
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_output_tokens)
            .clamp(self.min_output_tokens, self.max_output_tokens)
    }
}

impl Default for CompletionLimits {
    fn default() -> Self {
        Self {
            min_output_tokens: 32,
            max_output_tokens: 8000,
            default_output_tokens: 512,
        }
    }
}

/// Worker-side execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub tool_timeout_ms: u64,
    pub completion_timeout_ms: u64,
    pub default_server_id: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            tool_timeout_ms: 30_000,
            completion_timeout_ms: 60_000,
            default_server_id: "remote_default".to_string(),
        }
    }
}

/// Immutable configuration injected into every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ladder: ModelLadder,
    /// Ceiling applied regardless of what a task declares.
    pub hard_cap_usd: f64,
    /// p95 cost above which the escalation policy prefers the mid tier.
    pub escalation_p95_threshold_usd: f64,
    pub estimator: EstimatorConfig,
    pub completion: CompletionLimits,
    pub worker: WorkerSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ladder: ModelLadder::default(),
            hard_cap_usd: 5.0,
            escalation_p95_threshold_usd: 1.0,
            estimator: EstimatorConfig::default(),
            completion: CompletionLimits::default(),
            worker: WorkerSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults or `path`, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env_overrides(|var| std::env::var(var).ok())
    }

    /// Apply `TASKGATE_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_env::<f64, _>(&lookup, ENV_HARD_CAP_USD)? {
            self.hard_cap_usd = v;
        }
        if let Some(v) = parse_env::<f64, _>(&lookup, ENV_P95_THRESHOLD_USD)? {
            self.escalation_p95_threshold_usd = v;
        }
        if let Some(v) = parse_env::<u64, _>(&lookup, ENV_TOOL_TIMEOUT_MS)? {
            self.worker.tool_timeout_ms = v;
        }
        if let Some(v) = parse_env::<u64, _>(&lookup, ENV_COMPLETION_TIMEOUT_MS)? {
            self.worker.completion_timeout_ms = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hard_cap_usd.is_finite() && self.hard_cap_usd > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "hard_cap_usd must be positive, got {}",
                self.hard_cap_usd
            )));
        }
        if self.escalation_p95_threshold_usd < 0.0 {
            return Err(ConfigError::Invalid(
                "escalation_p95_threshold_usd must not be negative".into(),
            ));
        }
        if self.estimator.chars_per_input_token <= 0.0 {
            return Err(ConfigError::Invalid(
                "estimator.chars_per_input_token must be positive".into(),
            ));
        }
        let limits = &self.completion;
        if limits.min_output_tokens > limits.max_output_tokens {
            return Err(ConfigError::Invalid(
                "completion.min_output_tokens exceeds completion.max_output_tokens".into(),
            ));
        }
        if self.worker.tool_timeout_ms == 0 || self.worker.completion_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

fn parse_env<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_ladder_tiers() {
        let ladder = ModelLadder::default();
        assert_eq!(ladder.cheapest().model, "openai:gpt-4o-mini");
        assert_eq!(ladder.mid().model, "openai:gpt-4o");
        assert_eq!(ladder.premium().model, "openai:gpt-5");
        assert_eq!(ladder.position("openai:gpt-5"), Some(2));
        assert!(!ladder.contains("anthropic:unknown"));
    }

    #[test]
    fn test_single_tier_ladder_collapses() {
        let ladder = ModelLadder::new(vec![ModelPrice::new("only", 1.0, 2.0)]).unwrap();
        assert_eq!(ladder.cheapest().model, "only");
        assert_eq!(ladder.mid().model, "only");
        assert_eq!(ladder.premium().model, "only");
    }

    #[test]
    fn test_ladder_rejects_empty_and_duplicates() {
        assert!(ModelLadder::new(vec![]).is_err());
        let dup = vec![ModelPrice::new("a", 1.0, 1.0), ModelPrice::new("a", 2.0, 2.0)];
        assert!(ModelLadder::new(dup).is_err());
    }

    #[test]
    fn test_toml_partial_overrides_keep_defaults() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
            hard_cap_usd = 2.5

            [estimator]
            chars_per_input_token = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.hard_cap_usd, 2.5);
        assert_eq!(cfg.estimator.chars_per_input_token, 4.0);
        assert_eq!(cfg.estimator.output_tokens_per_criterion, 180.0);
        assert_eq!(cfg.ladder, ModelLadder::default());
    }

    #[test]
    fn test_toml_custom_ladder() {
        let cfg = PipelineConfig::from_toml_str(
            r#"
            [[ladder]]
            model = "local:small"
            input_per_1m = 0.0
            output_per_1m = 0.0

            [[ladder]]
            model = "local:large"
            input_per_1m = 1.0
            output_per_1m = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ladder.len(), 2);
        assert_eq!(cfg.ladder.premium().model, "local:large");
    }

    #[test]
    fn test_toml_empty_ladder_rejected() {
        assert!(PipelineConfig::from_toml_str("ladder = []").is_err());
    }

    #[test]
    fn test_env_overrides_apply() {
        let env: HashMap<&str, &str> = [(ENV_HARD_CAP_USD, "3"), (ENV_TOOL_TIMEOUT_MS, "250")]
            .into_iter()
            .collect();
        let cfg = PipelineConfig::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.hard_cap_usd, 3.0);
        assert_eq!(cfg.worker.tool_timeout_ms, 250);
        assert_eq!(cfg.escalation_p95_threshold_usd, 1.0);
    }

    #[test]
    fn test_env_override_garbage_rejected() {
        let err = PipelineConfig::default()
            .with_env_overrides(|k| (k == ENV_HARD_CAP_USD).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_non_positive_hard_cap_rejected() {
        let cfg = PipelineConfig {
            hard_cap_usd: 0.0,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_completion_clamp() {
        let limits = CompletionLimits::default();
        assert_eq!(limits.clamp(None), 512);
        assert_eq!(limits.clamp(Some(1)), 32);
        assert_eq!(limits.clamp(Some(100_000)), 8000);
        assert_eq!(limits.clamp(Some(700)), 700);
    }
}
