//! Tool server registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{TransportError, TransportKind};

/// Connection details for a tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum ServerEndpoint {
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    Https {
        endpoint: String,
    },
}

impl ServerEndpoint {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Stdio { .. } => TransportKind::Stdio,
            Self::Https { .. } => TransportKind::Https,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_id: String,
    #[serde(flatten)]
    pub endpoint: ServerEndpoint,
    /// Name of the environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_ref: Option<String>,
}

/// Registered tool servers, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRegistry {
    servers: BTreeMap<String, ServerConfig>,
}

impl ServerRegistry {
    pub fn empty() -> Self {
        Self {
            servers: BTreeMap::new(),
        }
    }

    /// Register `config`, replacing any server with the same id.
    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.servers.insert(config.server_id.clone(), config);
        self
    }

    pub fn get(&self, server_id: &str) -> Result<&ServerConfig, TransportError> {
        self.servers
            .get(server_id)
            .ok_or_else(|| TransportError::UnknownServer(server_id.to_string()))
    }

    pub fn list(&self) -> impl Iterator<Item = &ServerConfig> {
        self.servers.values()
    }
}

impl Default for ServerRegistry {
    /// `local_fs` over stdio and `remote_default` over https.
    fn default() -> Self {
        Self::empty()
            .with_server(ServerConfig {
                server_id: "local_fs".into(),
                endpoint: ServerEndpoint::Stdio {
                    command: "npx".into(),
                    args: vec![
                        "-y".into(),
                        "@modelcontextprotocol/server-filesystem".into(),
                        ".".into(),
                    ],
                },
                auth_ref: Some("MCP_TOKEN_LOCAL_FS".into()),
            })
            .with_server(ServerConfig {
                server_id: "remote_default".into(),
                endpoint: ServerEndpoint::Https {
                    endpoint: "https://example-mcp-server.invalid/mcp".into(),
                },
                auth_ref: Some("MCP_TOKEN_REMOTE_DEFAULT".into()),
            })
    }
}

/// Resolve the token named by `auth_ref` through `lookup`. Empty values count as absent.
pub fn resolve_auth_token<F>(auth_ref: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    auth_ref
        .and_then(|name| lookup(name))
        .filter(|token| !token.is_empty())
}
