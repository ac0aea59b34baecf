use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::llm::domain::backend_config::{BackendConfig, ProviderKind};
use crate::llm::domain::backend_error::BackendError;
use crate::llm::domain::text_backend::TextBackend;
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::DEFAULT_CLOUD_API_VERSION;
use crate::shared::diagnostics::{redact_secret, Diagnostics};

use super::http_exchange::{build_client, encode_json, read_json, send};
use super::wire_codec::{extract_responses_text, ResponsesRequest, ResponsesResponse};

/// Client for the Azure OpenAI "responses" API, authenticated with a bearer
/// token.
pub struct ResponsesClient {
    http: Client,
    url: String,
    model: String,
    api_key: String,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ResponsesClient {
    pub fn new(
        config: &BackendConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BackendError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            BackendError::Configuration("responses backend requires an API key".to_string())
        })?;
        let version = config
            .api_version
            .as_deref()
            .unwrap_or(DEFAULT_CLOUD_API_VERSION);
        let url = format!(
            "{}/openai/responses?api-version={version}",
            config.endpoint.trim_end_matches('/')
        );
        diagnostics.info(&format!(
            "responses backend {url} model={} key={}",
            config.model,
            redact_secret(&api_key)
        ));
        Ok(Self {
            http: build_client(config.timeout)?,
            url,
            model: config.model.clone(),
            api_key,
            diagnostics,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TextBackend for ResponsesClient {
    fn ask_text(
        &self,
        system_instruction: &str,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError> {
        let body = encode_json(&ResponsesRequest::new(
            &self.model,
            system_instruction,
            user_text,
        ))?;
        let request = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone());

        let response = send(
            request,
            "POST",
            &self.url,
            Some(&body),
            self.diagnostics.as_ref(),
            cancel,
        )?;
        let decoded: ResponsesResponse =
            read_json(response, &self.url, self.diagnostics.as_ref())?;
        extract_responses_text(decoded)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Responses
    }
}
