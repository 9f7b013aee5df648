//! Language model provider.
//!
//! # Modules
//!
//! - [`openai`]: chat-completions client over `reqwest`
//! - [`synthetic`]: deterministic offline stand-in, flagged as synthetic

pub mod openai;
pub mod synthetic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompletionLimits;

pub use openai::OpenAiProvider;
pub use synthetic::SyntheticProvider;

/// Environment variable holding the OpenAI API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unsupported model provider in '{0}'")]
    UnsupportedModel(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("completion timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl ProviderError {
    /// Short machine-readable reason recorded on a failed worker output.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::UnsupportedModel(_) => "unsupported_model",
            Self::Request(_) | Self::Api { .. } => "provider_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Timeout { .. } => "timeout",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Ladder model id, `provider:name`.
    pub model: String,
    pub system: String,
    pub prompt: String,
    /// Requested completion ceiling; providers clamp it.
    pub max_output_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// `true` when produced without contacting a real model.
    pub synthetic: bool,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}

/// Split a `provider:name` id, accepting only the `openai` provider.
pub fn openai_model_name(model: &str) -> Result<&str, ProviderError> {
    match model.split_once(':') {
        Some(("openai", name)) if !name.is_empty() => Ok(name),
        _ => Err(ProviderError::UnsupportedModel(model.to_string())),
    }
}

/// Real client when an API key is available through `lookup`, synthetic otherwise.
/// Either one clamps completions to `limits`.
pub fn provider_from_lookup<F>(lookup: F, limits: &CompletionLimits) -> Box<dyn LlmProvider>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(ENV_OPENAI_API_KEY).filter(|key| !key.is_empty()) {
        Some(key) => {
            tracing::debug!("using openai provider");
            Box::new(OpenAiProvider::new(key).with_limits(*limits))
        }
        None => {
            tracing::debug!("no api key configured; using synthetic provider");
            Box::new(SyntheticProvider::new().with_limits(*limits))
        }
    }
}

/// [`provider_from_lookup`] over the process environment.
pub fn provider_from_env(limits: &CompletionLimits) -> Box<dyn LlmProvider> {
    provider_from_lookup(|var| std::env::var(var).ok(), limits)
}
