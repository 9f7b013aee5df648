//! Execution package builder.

use crate::capability::package_scope;
use crate::domain::{
    ExecutionPackage, IoSchemas, OrchestratedPlan, PackageTest, PackageTools, ToolAllowList,
};

const INSTRUCTIONS: &str = "Execute the task deterministically, satisfy acceptance criteria, \
prefer concise outputs, and call only allowed MCP tools when needed.";

const RUBRIC: [&str; 4] = [
    "Meets all acceptance criteria.",
    "Uses only allowed tools.",
    "Maintains safe and policy-compliant behavior.",
    "Produces readable, structured output.",
];

/// Assemble the worker contract for `plan` on `model`.
///
/// `plan` must carry the planner's authoritative skill list.
pub fn build_package(plan: &OrchestratedPlan, model: &str) -> ExecutionPackage {
    let task = &plan.normalized_task;

    ExecutionPackage {
        run_id: plan.run_id.clone(),
        task_id: task.task_id.clone(),
        model: model.to_string(),
        instructions: INSTRUCTIONS.to_string(),
        skills: task.skills.clone(),
        io_schemas: IoSchemas {
            input: "TaskSpec".to_string(),
            output: "WorkerOutput".to_string(),
        },
        rubric: RUBRIC.iter().map(|item| item.to_string()).collect(),
        tests: task
            .acceptance_criteria
            .iter()
            .enumerate()
            .map(|(i, criterion)| PackageTest {
                name: format!("criterion_{}", i + 1),
                assertion: criterion.clone(),
            })
            .collect(),
        tools: PackageTools {
            mcp_scope: ToolAllowList {
                allow: package_scope(task.allowed_tools(), &task.skills),
            },
        },
    }
}
