//! Call-time tool routing.
//!
//! Every tool call passes through [`ToolRouter::route`]: authorize against
//! `task ∩ package ∩ skill`, record the decision, and only then reach the
//! transport under a timeout.

use std::time::Duration;

use chrono::Utc;

use crate::domain::{ExecutionPackage, TaskSpec};
use crate::metrics::METRICS;
use crate::obs;
use crate::transport::{ToolResponse, ToolTransport};

use super::error::{CapabilityError, RouteError, RouteResult};
use super::scope::{authorize, AuthorizationDecision, ToolCall};
use super::trace::{TraceEntry, TraceRecorder, TraceStatus};

/// Routes tool calls for one run.
pub struct ToolRouter<'a> {
    task: &'a TaskSpec,
    package: &'a ExecutionPackage,
    transport: &'a dyn ToolTransport,
    recorder: &'a dyn TraceRecorder,
    timeout: Duration,
}

impl<'a> ToolRouter<'a> {
    pub fn new(
        task: &'a TaskSpec,
        package: &'a ExecutionPackage,
        transport: &'a dyn ToolTransport,
        recorder: &'a dyn TraceRecorder,
        timeout: Duration,
    ) -> Self {
        Self {
            task,
            package,
            transport,
            recorder,
            timeout,
        }
    }

    /// Authorize and execute `call`.
    ///
    /// A denial is traced and returned as [`RouteError::Capability`] without
    /// touching the transport. Granted calls are traced after execution with
    /// `ok`, `error` or `timeout`.
    pub async fn route(&self, call: &ToolCall) -> RouteResult<ToolResponse> {
        if let AuthorizationDecision::Denied { reason } = authorize(self.task, self.package, call) {
            self.recorder.record(&TraceEntry {
                ts: Utc::now(),
                status: TraceStatus::Denied,
                tool: call.tool.clone(),
                skill_id: call.skill_id.clone(),
                server_id: call.server_id.clone(),
                reason: Some(reason.clone()),
                transport: None,
                args_shape: Vec::new(),
            })
            .await?;
            METRICS.inc_tool_denials();
            obs::emit_tool_denied(&call.skill_id, &call.tool, &reason);
            return Err(CapabilityError::Denied {
                tool: call.tool.clone(),
                skill_id: call.skill_id.clone(),
                reason,
            }
            .into());
        }

        obs::emit_tool_authorized(&call.skill_id, &call.tool, &call.server_id);
        METRICS.inc_tool_calls();

        let outcome = tokio::time::timeout(
            self.timeout,
            self.transport.invoke(&call.server_id, &call.tool, &call.args),
        )
        .await;

        let mut entry = TraceEntry {
            ts: Utc::now(),
            status: TraceStatus::Ok,
            tool: call.tool.clone(),
            skill_id: call.skill_id.clone(),
            server_id: call.server_id.clone(),
            reason: None,
            transport: None,
            args_shape: args_shape(&call.args),
        };

        match outcome {
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                entry.status = TraceStatus::Timeout;
                entry.reason = Some(format!("no response within {timeout_ms}ms"));
                self.recorder.record(&entry).await?;
                Err(RouteError::Timeout {
                    tool: call.tool.clone(),
                    timeout_ms,
                })
            }
            Ok(Err(err)) => {
                entry.status = TraceStatus::Error;
                entry.reason = Some(err.to_string());
                self.recorder.record(&entry).await?;
                Err(err.into())
            }
            Ok(Ok(response)) => {
                if !response.ok {
                    entry.status = TraceStatus::Error;
                }
                entry.transport = Some(response.transport);
                self.recorder.record(&entry).await?;
                Ok(response)
            }
        }
    }
}

/// Top-level argument keys, in their serialized order.
fn args_shape(args: &serde_json::Value) -> Vec<String> {
    args.as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}
