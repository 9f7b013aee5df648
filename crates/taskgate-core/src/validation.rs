//! Payload validation for the four externally visible document kinds.
//!
//! Two layers:
//! 1. Shape: typed deserialization rejects unknown or missing fields and
//!    out-of-range enum values (e.g. a risk level outside `low|medium|high`).
//! 2. Semantics: non-empty ids, non-negative budgets and costs, scores within
//!    `[0, 1]`, token totals that add up.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{AuditReport, ExecutionPackage, PreflightReport, TaskSpec, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    TaskSpec,
    PreflightReport,
    BotPackage,
    AuditReport,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        Self::TaskSpec,
        Self::PreflightReport,
        Self::BotPackage,
        Self::AuditReport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskSpec => "task_spec",
            Self::PreflightReport => "preflight_report",
            Self::BotPackage => "bot_package",
            Self::AuditReport => "audit_report",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown schema kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Semantic checks beyond what the type already guarantees.
pub trait Validate {
    const KIND: SchemaKind;

    fn check(&self) -> Result<(), ValidationError>;
}

fn non_empty(kind: SchemaKind, field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::constraint(kind, field, "must not be empty"));
    }
    Ok(())
}

fn non_negative(kind: SchemaKind, field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::constraint(
            kind,
            field,
            format!("must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}

impl Validate for TaskSpec {
    const KIND: SchemaKind = SchemaKind::TaskSpec;

    fn check(&self) -> Result<(), ValidationError> {
        let kind = Self::KIND;
        non_empty(kind, "task_id", &self.task_id)?;
        non_empty(kind, "title", &self.title)?;
        non_empty(kind, "objective", &self.objective)?;
        non_negative(kind, "budget.max_usd", self.budget.max_usd)?;
        for (i, skill) in self.skills.iter().enumerate() {
            non_empty(kind, &format!("skills[{i}].skill_id"), &skill.skill_id)?;
        }
        Ok(())
    }
}

impl Validate for PreflightReport {
    const KIND: SchemaKind = SchemaKind::PreflightReport;

    fn check(&self) -> Result<(), ValidationError> {
        let kind = Self::KIND;
        non_empty(kind, "run_id", &self.run_id)?;
        non_empty(kind, "chosen_model", &self.chosen_model)?;

        let tokens = &self.token_estimate;
        if tokens.input_tokens.checked_add(tokens.output_tokens) != Some(tokens.total_tokens) {
            return Err(ValidationError::constraint(
                kind,
                "token_estimate.total_tokens",
                "must equal input_tokens + output_tokens",
            ));
        }
        if self.cost_estimates.is_empty() {
            return Err(ValidationError::constraint(kind, "cost_estimates", "must not be empty"));
        }
        for (i, cost) in self.cost_estimates.iter().enumerate() {
            non_empty(kind, &format!("cost_estimates[{i}].model"), &cost.model)?;
            non_negative(kind, &format!("cost_estimates[{i}].total_cost_usd"), cost.total_cost_usd)?;
        }
        non_negative(kind, "p90_cost_usd", self.p90_cost_usd)?;
        non_negative(kind, "p95_cost_usd", self.p95_cost_usd)?;
        non_negative(kind, "recommended_caps.max_usd", self.recommended_caps.max_usd)?;
        Ok(())
    }
}

impl Validate for ExecutionPackage {
    const KIND: SchemaKind = SchemaKind::BotPackage;

    fn check(&self) -> Result<(), ValidationError> {
        let kind = Self::KIND;
        non_empty(kind, "run_id", &self.run_id)?;
        non_empty(kind, "task_id", &self.task_id)?;
        non_empty(kind, "model", &self.model)?;
        non_empty(kind, "instructions", &self.instructions)?;
        for (i, test) in self.tests.iter().enumerate() {
            non_empty(kind, &format!("tests[{i}].name"), &test.name)?;
        }
        Ok(())
    }
}

impl Validate for AuditReport {
    const KIND: SchemaKind = SchemaKind::AuditReport;

    fn check(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.score) {
            return Err(ValidationError::constraint(
                Self::KIND,
                "score",
                format!("must be within [0, 1], got {}", self.score),
            ));
        }
        Ok(())
    }
}

/// Deserialize `payload` as `T` and run its semantic checks.
pub fn validate_as<T>(payload: &serde_json::Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T =
        serde_json::from_value(payload.clone()).map_err(|e| ValidationError::Schema {
            kind: T::KIND,
            message: e.to_string(),
        })?;
    value.check()?;
    Ok(value)
}

/// Validate `payload` as `kind`, returning it unchanged on success.
pub fn validate(kind: SchemaKind, payload: &serde_json::Value) -> Result<serde_json::Value, ValidationError> {
    match kind {
        SchemaKind::TaskSpec => validate_as::<TaskSpec>(payload).map(drop),
        SchemaKind::PreflightReport => validate_as::<PreflightReport>(payload).map(drop),
        SchemaKind::BotPackage => validate_as::<ExecutionPackage>(payload).map(drop),
        SchemaKind::AuditReport => validate_as::<AuditReport>(payload).map(drop),
    }?;
    Ok(payload.clone())
}

/// Check an internally produced document against its wire schema.
pub fn ensure_valid<T>(document: &T) -> Result<(), ValidationError>
where
    T: Serialize + DeserializeOwned + Validate,
{
    let payload = serde_json::to_value(document).map_err(|e| ValidationError::Schema {
        kind: T::KIND,
        message: e.to_string(),
    })?;
    validate_as::<T>(&payload).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_payload() -> serde_json::Value {
        json!({
            "task_id": "t-1",
            "title": "Summarize",
            "description": "Summarize the report",
            "objective": "Short summary",
            "acceptance_criteria": ["mentions root cause"],
            "risk_level": "low",
            "budget": {"max_usd": 1.0, "max_input_tokens": 100, "max_output_tokens": 100},
            "tools": {"mcp": {"allow": []}},
            "skills": []
        })
    }

    #[test]
    fn test_valid_task_returns_payload() {
        let payload = task_payload();
        assert_eq!(validate(SchemaKind::TaskSpec, &payload).unwrap(), payload);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut payload = task_payload();
        payload["surprise"] = json!(true);
        let err = validate(SchemaKind::TaskSpec, &payload).unwrap_err();
        assert!(matches!(err, ValidationError::Schema { kind: SchemaKind::TaskSpec, .. }));
        assert!(err.to_string().contains("surprise"));
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut payload = task_payload();
        payload.as_object_mut().unwrap().remove("objective");
        assert!(validate(SchemaKind::TaskSpec, &payload).is_err());
    }

    #[test]
    fn test_bad_risk_level_rejected() {
        let mut payload = task_payload();
        payload["risk_level"] = json!("extreme");
        assert!(validate(SchemaKind::TaskSpec, &payload).is_err());
    }

    #[test]
    fn test_negative_budget_rejected() {
        let mut payload = task_payload();
        payload["budget"]["max_usd"] = json!(-1.0);
        let err = validate(SchemaKind::TaskSpec, &payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::constraint(
                SchemaKind::TaskSpec,
                "budget.max_usd",
                "must be a non-negative number, got -1"
            )
        );
    }

    #[test]
    fn test_blank_task_id_rejected() {
        let mut payload = task_payload();
        payload["task_id"] = json!("  ");
        let err = validate(SchemaKind::TaskSpec, &payload).unwrap_err();
        assert_eq!(err.to_string(), "invalid task_spec: task_id must not be empty");
    }

    #[test]
    fn test_audit_score_out_of_range() {
        let payload = json!({
            "audit_type": "risk",
            "status": "pass",
            "score": 1.5,
            "findings": [],
            "recommendations": []
        });
        assert!(validate(SchemaKind::AuditReport, &payload).is_err());
    }

    #[test]
    fn test_preflight_token_totals_must_add_up() {
        let payload = json!({
            "run_id": "r",
            "token_estimate": {"input_tokens": 1, "output_tokens": 2, "total_tokens": 4},
            "cost_estimates": [{"model": "m", "input_cost_usd": 0.0, "output_cost_usd": 0.0, "total_cost_usd": 0.0}],
            "p90_cost_usd": 0.0,
            "p95_cost_usd": 0.0,
            "approve": true,
            "reason": "ok",
            "recommended_caps": {"max_input_tokens": 1, "max_output_tokens": 2, "max_usd": 1.0},
            "chosen_model": "m"
        });
        let err = validate(SchemaKind::PreflightReport, &payload).unwrap_err();
        assert!(err.to_string().contains("total_tokens"));
    }

    #[test]
    fn test_preflight_token_overflow_rejected() {
        let payload = json!({
            "run_id": "r",
            "token_estimate": {"input_tokens": u64::MAX, "output_tokens": 2, "total_tokens": 1},
            "cost_estimates": [{"model": "m", "input_cost_usd": 0.0, "output_cost_usd": 0.0, "total_cost_usd": 0.0}],
            "p90_cost_usd": 0.0,
            "p95_cost_usd": 0.0,
            "approve": true,
            "reason": "ok",
            "recommended_caps": {"max_input_tokens": 1, "max_output_tokens": 2, "max_usd": 1.0},
            "chosen_model": "m"
        });
        let err = validate(SchemaKind::PreflightReport, &payload).unwrap_err();
        assert!(err.to_string().contains("total_tokens"));
    }

    #[test]
    fn test_schema_kind_parses() {
        assert_eq!("bot_package".parse::<SchemaKind>().unwrap(), SchemaKind::BotPackage);
        assert!("nope".parse::<SchemaKind>().is_err());
    }
}
