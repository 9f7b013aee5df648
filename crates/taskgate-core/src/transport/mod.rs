//! Tool execution transport.
//!
//! The transport is reachable only through
//! [`ToolRouter`](crate::capability::ToolRouter); worker logic never holds a
//! transport directly.
//!
//! # Modules
//!
//! - [`registry`]: named tool servers and auth token resolution
//! - [`stub`]: synthetic transport that echoes requests

pub mod registry;
pub mod stub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use registry::{resolve_auth_token, ServerConfig, ServerEndpoint, ServerRegistry};
pub use stub::StubTransport;

/// How a tool server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Stdio,
    Https,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Response of one remote tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub ok: bool,
    pub data: serde_json::Value,
    pub transport: TransportKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("tool server not registered: {0}")]
    UnknownServer(String),

    #[error("tool server '{server_id}' failed: {message}")]
    Failed { server_id: String, message: String },
}

/// Remote procedure invocation of a named tool on a named server.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn invoke(
        &self,
        server_id: &str,
        tool: &str,
        args: &serde_json::Value,
    ) -> Result<ToolResponse, TransportError>;
}
