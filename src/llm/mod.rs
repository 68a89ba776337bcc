//! LLM integration for the survey judge.
//!
//! Only one backend is supported: an OpenAI-compatible chat-completions
//! endpoint, reached directly over `reqwest`.

mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;

use secrecy::SecretString;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub api_base: String,
}

impl From<&crate::config::SurveyConfig> for LlmConfig {
    fn from(config: &crate::config::SurveyConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
        }
    }
}

/// Create an LLM provider from configuration.
///
/// Construction never fails on a missing credential; that surfaces on the
/// first request instead.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; every judge call will fail closed");
    }
    tracing::info!("Using OpenAI (model: {})", config.model);
    Arc::new(OpenAiProvider::new(
        config.api_key.clone(),
        &config.model,
        &config.api_base,
    ))
}
