//! Execution package: the contract handed to the worker.

use serde::{Deserialize, Serialize};

use super::task::{Skill, ToolAllowList};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoSchemas {
    pub input: String,
    pub output: String,
}

/// One generated acceptance test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageTest {
    pub name: String,
    pub assertion: String,
}

/// Resolved tool scope (`tools.mcp_scope.allow` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageTools {
    pub mcp_scope: ToolAllowList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionPackage {
    pub run_id: String,
    pub task_id: String,
    pub model: String,
    pub instructions: String,
    pub skills: Vec<Skill>,
    pub io_schemas: IoSchemas,
    pub rubric: Vec<String>,
    pub tests: Vec<PackageTest>,
    pub tools: PackageTools,
}

impl ExecutionPackage {
    /// Tools this package may expose.
    pub fn allowed_tools(&self) -> &[String] {
        &self.tools.mcp_scope.allow
    }
}
