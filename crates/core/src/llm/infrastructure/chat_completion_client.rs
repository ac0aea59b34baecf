use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::llm::domain::backend_config::{BackendConfig, ProviderKind};
use crate::llm::domain::backend_error::BackendError;
use crate::llm::domain::text_backend::TextBackend;
use crate::shared::cancellation::CancellationToken;
use crate::shared::diagnostics::Diagnostics;

use super::http_exchange::{build_client, encode_json, read_json, send};
use super::wire_codec::{extract_chat_text, ChatRequest, ChatResponse};

/// Client for OpenAI-compatible `/v1/chat/completions` servers.
///
/// Self-hosted servers normally run without auth; a bearer token is sent
/// only if the config carries one.
pub struct ChatCompletionClient {
    http: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ChatCompletionClient {
    pub fn new(
        config: &BackendConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            http: build_client(config.timeout)?,
            url: chat_completions_url(&config.endpoint),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            diagnostics,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Resolves the completions URL, respecting a path the user already supplied.
pub fn chat_completions_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{endpoint}/chat/completions")
    } else {
        format!("{endpoint}/v1/chat/completions")
    }
}

impl TextBackend for ChatCompletionClient {
    fn ask_text(
        &self,
        system_instruction: &str,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError> {
        let body = encode_json(&ChatRequest::new(&self.model, system_instruction, user_text))?;
        let mut request = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = send(
            request,
            "POST",
            &self.url,
            Some(&body),
            self.diagnostics.as_ref(),
            cancel,
        )?;
        let decoded: ChatResponse = read_json(response, &self.url, self.diagnostics.as_ref())?;
        extract_chat_text(decoded)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::ChatCompletion
    }
}
