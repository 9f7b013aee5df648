//! Error types for the capability layer.

use crate::transport::TransportError;

/// A tool was requested outside the resolved allow-set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("tool '{tool}' is not allowed for skill '{skill_id}': {reason}")]
    Denied {
        tool: String,
        skill_id: String,
        reason: String,
    },
}

/// Failure of a single routed tool call.
///
/// Each variant is a distinct failure reason: a denial, a transport failure
/// and a timeout are never conflated.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    #[error("failed to record tool trace: {0}")]
    Trace(#[from] std::io::Error),
}

impl RouteError {
    /// Short machine-readable reason recorded on the failed tool call.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Capability(_) => "capability_denied",
            Self::Transport(_) => "transport_error",
            Self::Timeout { .. } => "timeout",
            Self::Trace(_) => "trace_error",
        }
    }
}

/// Result type for routed tool calls.
pub type RouteResult<T> = std::result::Result<T, RouteError>;
