//! Allow-set resolution and the call-time authorization predicate.
//!
//! Everything here is pure: no I/O, no tracing side effects. The router
//! wraps these functions with trace recording and transport invocation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{ExecutionPackage, Skill, TaskSpec};

/// Reason recorded when a tool is outside the resolved allow-set.
pub const DENIAL_REASON: &str = "not in intersection allowlist";

/// A tool invocation requested by the worker under a specific skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub skill_id: String,
    pub tool: String,
    pub server_id: String,
    pub args: serde_json::Value,
}

/// Outcome of authorizing a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthorizationDecision {
    Granted,
    Denied { reason: String },
}

impl AuthorizationDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Members of `left` also present in `right`, in `left`'s order, without duplicates.
pub fn intersect(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    left.iter()
        .filter(|tool| right.contains(tool.as_str()) && seen.insert(tool.as_str()))
        .cloned()
        .collect()
}

/// Tools an execution package may expose.
///
/// The task allow-list filtered by the intersection of every skill's
/// allow-list. With no skills the task allow-list is returned verbatim.
pub fn package_scope(task_allow: &[String], skills: &[Skill]) -> Vec<String> {
    match skills.split_first() {
        None => task_allow.to_vec(),
        Some((first, rest)) => {
            let common = rest.iter().fold(first.tools_allowed.clone(), |acc, skill| {
                intersect(&acc, &skill.tools_allowed)
            });
            intersect(task_allow, &common)
        }
    }
}

/// Call-time allow-set: `task ∩ package ∩ skill`.
///
/// Deny-by-default: an unknown skill id yields the empty set.
pub fn allowed_for_skill(task: &TaskSpec, package: &ExecutionPackage, skill_id: &str) -> Vec<String> {
    match task.skill(skill_id) {
        None => Vec::new(),
        Some(skill) => intersect(
            &intersect(task.allowed_tools(), package.allowed_tools()),
            &skill.tools_allowed,
        ),
    }
}

/// Authorize `call` against the task, the package and the calling skill.
pub fn authorize(task: &TaskSpec, package: &ExecutionPackage, call: &ToolCall) -> AuthorizationDecision {
    let allowed = allowed_for_skill(task, package, &call.skill_id);
    if allowed.iter().any(|tool| tool == &call.tool) {
        AuthorizationDecision::Granted
    } else {
        AuthorizationDecision::Denied {
            reason: DENIAL_REASON.to_string(),
        }
    }
}
