use std::sync::Arc;

use crate::llm::domain::backend_config::{BackendConfig, ProviderKind};
use crate::llm::domain::backend_error::BackendError;
use crate::llm::domain::text_backend::TextBackend;
use crate::shared::cancellation::CancellationToken;
use crate::shared::diagnostics::Diagnostics;

use super::chat_completion_client::ChatCompletionClient;
use super::responses_client::ResponsesClient;

/// The synchronous-text backend chosen at startup.
///
/// A closed set: new protocols are added as variants, not registered at
/// runtime. Built once and never switched.
pub enum LlmClient {
    ChatCompletion(ChatCompletionClient),
    Responses(ResponsesClient),
}

impl LlmClient {
    pub fn from_config(
        config: &BackendConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BackendError> {
        match config.kind {
            ProviderKind::ChatCompletion => Ok(LlmClient::ChatCompletion(
                ChatCompletionClient::new(config, diagnostics)?,
            )),
            ProviderKind::Responses => Ok(LlmClient::Responses(ResponsesClient::new(
                config,
                diagnostics,
            )?)),
            ProviderKind::MediaGeneration => Err(BackendError::Configuration(
                "the media-generation backend cannot answer text requests".to_string(),
            )),
        }
    }
}

impl TextBackend for LlmClient {
    fn ask_text(
        &self,
        system_instruction: &str,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError> {
        match self {
            LlmClient::ChatCompletion(client) => {
                client.ask_text(system_instruction, user_text, cancel)
            }
            LlmClient::Responses(client) => client.ask_text(system_instruction, user_text, cancel),
        }
    }

    fn kind(&self) -> ProviderKind {
        match self {
            LlmClient::ChatCompletion(_) => ProviderKind::ChatCompletion,
            LlmClient::Responses(_) => ProviderKind::Responses,
        }
    }
}
