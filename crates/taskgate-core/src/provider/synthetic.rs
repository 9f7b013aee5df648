//! Deterministic offline provider.

use async_trait::async_trait;

use crate::config::CompletionLimits;

use super::{openai_model_name, CompletionRequest, CompletionResponse, LlmProvider, ProviderError};

/// Prompt characters echoed back in the simulated reply.
const ECHO_CHARS: usize = 120;

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    limits: CompletionLimits,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: CompletionLimits) -> Self {
        self.limits = limits;
        self
    }
}

fn approx_tokens(chars: usize) -> u64 {
    chars.div_ceil(4) as u64
}

#[async_trait]
impl LlmProvider for SyntheticProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        openai_model_name(&request.model)?;
        let ceiling = self.limits.clamp(request.max_output_tokens);

        let echo: String = request.prompt.chars().take(ECHO_CHARS).collect();
        let content = format!("Simulated response for {}: {echo}", request.model);
        let input_tokens =
            approx_tokens(request.system.chars().count() + request.prompt.chars().count());
        let output_tokens = approx_tokens(content.chars().count()).min(ceiling);

        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            input_tokens,
            output_tokens,
            synthetic: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str, max: Option<u64>) -> CompletionRequest {
        CompletionRequest {
            model: "openai:gpt-4o-mini".into(),
            system: "abcd".into(),
            prompt: prompt.into(),
            max_output_tokens: max,
        }
    }

    #[tokio::test]
    async fn test_simulated_reply_shape() {
        let resp = SyntheticProvider::new()
            .complete(&request("hello world", None))
            .await
            .unwrap();
        assert_eq!(resp.content, "Simulated response for openai:gpt-4o-mini: hello world");
        assert_eq!(resp.input_tokens, 4);
        assert!(resp.synthetic);
    }

    #[tokio::test]
    async fn test_prompt_echo_is_truncated() {
        let prompt = "x".repeat(500);
        let resp = SyntheticProvider::new()
            .complete(&request(&prompt, None))
            .await
            .unwrap();
        assert_eq!(resp.content.matches('x').count(), ECHO_CHARS);
    }

    #[tokio::test]
    async fn test_output_tokens_respect_clamped_ceiling() {
        let prompt = "y".repeat(500);
        // 1 is clamped up to the 32 token floor.
        let resp = SyntheticProvider::new()
            .complete(&request(&prompt, Some(1)))
            .await
            .unwrap();
        assert_eq!(resp.output_tokens, 32);
    }

    #[tokio::test]
    async fn test_rejects_foreign_provider() {
        let mut req = request("p", None);
        req.model = "local:llama".into();
        assert!(SyntheticProvider::new().complete(&req).await.is_err());
    }
}
