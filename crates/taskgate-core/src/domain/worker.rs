//! Worker output model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Completed,
    Failed,
}

/// One tool invocation attempted by the worker, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    pub result: serde_json::Value,
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerOutput {
    pub status: WorkerStatus,
    pub model_used: String,
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub estimated_cost_usd: f64,
    /// Why the worker failed, when `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl WorkerOutput {
    /// Derive a copy attributed to `model`.
    ///
    /// The release artifact carries the latest escalation decision, which may
    /// differ from the model the worker actually ran.
    pub fn attributed_to(&self, model: &str) -> Self {
        Self {
            model_used: model.to_string(),
            ..self.clone()
        }
    }
}
