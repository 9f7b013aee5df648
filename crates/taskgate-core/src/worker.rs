//! Worker execution.
//!
//! One tool call through the capability router, then one model completion.
//! Tool failures become failed tool steps and the worker continues; a
//! provider failure or timeout yields `status = failed` with a reason.

use std::time::Duration;

use serde_json::json;

use crate::capability::{ToolCall, ToolRouter};
use crate::config::PipelineConfig;
use crate::domain::{ExecutionPackage, TaskSpec, ToolCallRecord, WorkerOutput, WorkerStatus};
use crate::preflight::round6;
use crate::provider::{CompletionRequest, CompletionResponse, LlmProvider, ProviderError};

pub struct WorkerInput<'a> {
    /// The authoritative task (planner output).
    pub task: &'a TaskSpec,
    pub package: &'a ExecutionPackage,
    pub router: &'a ToolRouter<'a>,
    pub provider: &'a dyn LlmProvider,
    pub config: &'a PipelineConfig,
    pub max_output_tokens: u64,
}

/// The one tool call the worker makes: the first skill's first allowed tool.
pub fn planned_tool_call(task: &TaskSpec, server_id: &str) -> Option<ToolCall> {
    let skill = task.skills.first()?;
    let tool = skill.tools_allowed.first()?;
    Some(ToolCall {
        skill_id: skill.skill_id.clone(),
        tool: tool.clone(),
        server_id: server_id.to_string(),
        args: json!({ "query": task.objective }),
    })
}

fn system_text(package: &ExecutionPackage) -> String {
    format!(
        "{}\nAllowed tools: {}",
        package.instructions,
        package.allowed_tools().join(",")
    )
}

fn prompt_text(task: &TaskSpec, tool_calls: &[ToolCallRecord]) -> String {
    let tool_results: Vec<_> = tool_calls
        .iter()
        .map(|call| json!({ "tool": call.tool, "ok": call.ok }))
        .collect();
    let prompt = json!({
        "task_id": task.task_id,
        "title": task.title,
        "objective": task.objective,
        "acceptance_criteria": task.acceptance_criteria,
        "tool_results": tool_results,
    });
    format!("{prompt:#}")
}

/// Cost of `response` on `model`. Models off the ladder are priced as premium.
pub fn completion_cost(config: &PipelineConfig, model: &str, response: &CompletionResponse) -> f64 {
    let price = config
        .ladder
        .price_of(model)
        .unwrap_or_else(|| config.ladder.premium());
    round6(
        response.input_tokens as f64 / 1_000_000.0 * price.input_per_1m
            + response.output_tokens as f64 / 1_000_000.0 * price.output_per_1m,
    )
}

async fn run_tool_step(input: &WorkerInput<'_>) -> Vec<ToolCallRecord> {
    let Some(call) = planned_tool_call(input.task, &input.config.worker.default_server_id) else {
        return Vec::new();
    };

    let record = match input.router.route(&call).await {
        Ok(response) => ToolCallRecord {
            tool: call.tool.clone(),
            server_id: Some(call.server_id.clone()),
            result: response.data,
            ok: response.ok,
        },
        Err(err) => {
            tracing::debug!(tool = %call.tool, reason = err.reason_code(), "tool step failed");
            ToolCallRecord {
                tool: call.tool.clone(),
                server_id: Some(call.server_id.clone()),
                result: json!({ "error": err.to_string(), "reason": err.reason_code() }),
                ok: false,
            }
        }
    };
    vec![record]
}

/// Execute the package and describe what happened.
pub async fn run_worker(input: WorkerInput<'_>) -> WorkerOutput {
    let tool_calls = run_tool_step(&input).await;
    let model = input.package.model.clone();

    let request = CompletionRequest {
        model: model.clone(),
        system: system_text(input.package),
        prompt: prompt_text(input.task, &tool_calls),
        max_output_tokens: Some(input.max_output_tokens),
    };

    let timeout_ms = input.config.worker.completion_timeout_ms;
    let completion = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        input.provider.complete(&request),
    )
    .await
    .unwrap_or(Err(ProviderError::Timeout { timeout_ms }));

    match completion {
        Ok(response) => {
            let estimated_cost_usd = completion_cost(input.config, &model, &response);
            tracing::debug!(
                model = %model,
                output_tokens = response.output_tokens,
                synthetic = response.synthetic,
                cost = estimated_cost_usd,
                "worker completed"
            );
            WorkerOutput {
                status: WorkerStatus::Completed,
                model_used: model,
                content: response.content,
                tool_calls,
                estimated_cost_usd,
                failure: None,
            }
        }
        Err(err) => {
            tracing::warn!(model = %model, reason = err.reason_code(), error = %err, "worker failed");
            WorkerOutput {
                status: WorkerStatus::Failed,
                model_used: model,
                content: String::new(),
                tool_calls,
                estimated_cost_usd: 0.0,
                failure: Some(format!("{}: {err}", err.reason_code())),
            }
        }
    }
}
