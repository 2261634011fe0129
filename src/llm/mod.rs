//! LLM integration for the completion-service proxy.
//!
//! Supports any OpenAI-compatible chat-completions endpoint. The proxy only
//! depends on the `LlmProvider` trait, so tests swap in stub providers.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub base_url: String,
    pub model: String,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::OpenAi => {
            tracing::info!("Using OpenAI-compatible backend (model: {})", config.model);
            Ok(Arc::new(OpenAiProvider::new(
                config.api_key.clone(),
                &config.base_url,
                &config.model,
            )))
        }
    }
}
