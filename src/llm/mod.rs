//! Language-model backends for the assistant.

pub mod openai;

use anyhow::Result;
use std::sync::Arc;

use crate::assistant::LanguageModel;
use crate::config::LlmConfig;

/// Build the configured language model.
pub fn create_model(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    if config.api_key.is_empty() {
        tracing::warn!(
            base_url = %config.base_url,
            "no LLM API key configured; set LARDER_LLM_API_KEY unless the endpoint is keyless"
        );
    }
    Ok(Arc::new(openai::OpenAiChatModel::from_config(config)?))
}
