//! LLM: multi-provider adapter for the shopping assistant.
//!
//! DESIGN
//! ======
//! The `LlmClient` enum dispatches to Anthropic or `OpenAI` based on
//! `LLM_PROVIDER`. The client holds no API key: the chat service picks a
//! credential from the quota tracker and hands it to every call, so a
//! single client rotates across all configured accounts.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

use config::{GenerationSettings, LlmConfig, LlmProviderKind};
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message};

use crate::quota::Credential;

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either Anthropic or OpenAI.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
    generation: GenerationSettings,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(config.timeouts)?),
            LlmProviderKind::OpenAi => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(config.openai_base_url, config.timeouts)?)
            }
        };
        Ok(Self { inner, model: config.model, generation: config.generation })
    }

    /// Return the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, credential: &Credential, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::Anthropic(c) => {
                c.chat(credential, &self.model, &self.generation, system, messages)
                    .await
            }
            LlmProvider::OpenAi(c) => {
                c.chat(credential, &self.model, &self.generation, system, messages)
                    .await
            }
        }
    }
}
