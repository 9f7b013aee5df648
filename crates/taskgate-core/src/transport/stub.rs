//! Synthetic transport.
//!
//! Resolves the server and its auth token, then echoes the request back
//! marked `stub: true`. Real stdio/https execution is out of scope.

use async_trait::async_trait;
use serde_json::json;

use super::{resolve_auth_token, ServerRegistry, ToolResponse, ToolTransport, TransportError};

pub struct StubTransport {
    registry: ServerRegistry,
    env: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl StubTransport {
    /// Stub over `registry`, reading auth tokens from the process environment.
    pub fn new(registry: ServerRegistry) -> Self {
        Self::with_env(registry, |name| std::env::var(name).ok())
    }

    pub fn with_env<F>(registry: ServerRegistry, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            registry,
            env: Box::new(env),
        }
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new(ServerRegistry::default())
    }
}

#[async_trait]
impl ToolTransport for StubTransport {
    async fn invoke(
        &self,
        server_id: &str,
        tool: &str,
        args: &serde_json::Value,
    ) -> Result<ToolResponse, TransportError> {
        let server = self.registry.get(server_id)?;
        let token = resolve_auth_token(server.auth_ref.as_deref(), |name| (self.env)(name));
        let transport = server.endpoint.kind();

        tracing::debug!(server_id, tool, %transport, "stub tool invocation");

        Ok(ToolResponse {
            ok: true,
            transport,
            data: json!({
                "stub": true,
                "note": format!("{transport} tool execution is stubbed in this implementation."),
                "server_id": server_id,
                "tool": tool,
                "args": args,
                "auth_present": token.is_some(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportKind;

    #[tokio::test]
    async fn test_stub_echoes_request() {
        let transport = StubTransport::with_env(ServerRegistry::default(), |name| {
            (name == "MCP_TOKEN_REMOTE_DEFAULT").then(|| "tok".to_string())
        });
        let resp = transport
            .invoke("remote_default", "search", &json!({"query": "q"}))
            .await
            .unwrap();
        assert!(resp.ok);
        assert_eq!(resp.transport, TransportKind::Https);
        assert_eq!(resp.data["stub"], true);
        assert_eq!(resp.data["auth_present"], true);
        assert_eq!(resp.data["args"]["query"], "q");
    }

    #[tokio::test]
    async fn test_stub_reports_missing_auth() {
        let transport = StubTransport::with_env(ServerRegistry::default(), |_| None);
        let resp = transport
            .invoke("local_fs", "read_file", &json!({}))
            .await
            .unwrap();
        assert_eq!(resp.transport, TransportKind::Stdio);
        assert_eq!(resp.data["auth_present"], false);
    }

    #[tokio::test]
    async fn test_stub_unknown_server() {
        let transport = StubTransport::default();
        let err = transport.invoke("ghost", "search", &json!({})).await.unwrap_err();
        assert!(matches!(err, TransportError::UnknownServer(_)));
    }
}
