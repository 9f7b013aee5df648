//! Crate-level error taxonomy.

use crate::capability::CapabilityError;
use crate::config::ConfigError;
use crate::provider::ProviderError;
use crate::store::StoreError;
use crate::transport::TransportError;
use crate::validation::SchemaKind;

/// A payload did not conform to its schema.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {kind}: {message}")]
    Schema { kind: SchemaKind, message: String },

    #[error("invalid {kind}: {field} {reason}")]
    Constraint {
        kind: SchemaKind,
        field: String,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn constraint(
        kind: SchemaKind,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Constraint {
            kind,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum TaskgateError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("artifact store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskgateError {
    /// Stable machine-readable category for error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Capability(_) => "capability_error",
            Self::Provider(_) => "provider_error",
            Self::Transport(_) => "transport_error",
            Self::Store(_) => "store_error",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) => "io_error",
        }
    }
}

/// Result type for taskgate operations.
pub type Result<T> = std::result::Result<T, TaskgateError>;
