use std::sync::Arc;

use reqwest::Url;

use crate::llm::domain::backend_config::{BackendConfig, ProviderKind};
use crate::llm::domain::backend_error::BackendError;
use crate::shared::constants::{
    CLOUD_TIMEOUT, DEFAULT_CLOUD_API_VERSION, DEFAULT_LOCAL_MODEL, DEFAULT_MEDIA_MODEL,
    LOCAL_TIMEOUT, MEDIA_BASE_URL, MEDIA_TIMEOUT,
};
use crate::shared::diagnostics::Diagnostics;

use super::llm_client::LlmClient;

/// Raw configuration values as found in the environment or on the command
/// line. Empty strings are treated as unset.
#[derive(Clone, Default)]
pub struct ProviderSources {
    pub local_endpoint: Option<String>,
    pub local_model: Option<String>,
    pub cloud_endpoint: Option<String>,
    pub cloud_api_key: Option<String>,
    pub cloud_model: Option<String>,
    pub cloud_api_version: Option<String>,
}

const SETUP_GUIDANCE: &str = "No LLM backend is configured. Choose one:\n\
  - Self-hosted: set LOCAL_LLM_ENDPOINT (e.g. http://localhost:11434) and optionally LOCAL_LLM_MODEL\n\
  - Azure OpenAI: set AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_API_KEY and AZURE_OPENAI_MODEL \
(endpoint and key are under \"Keys and Endpoint\" of your resource in the Azure portal; \
AZURE_OPENAI_API_VERSION is optional)";

const MEDIA_GUIDANCE: &str = "Transcription needs GEMINI_API_KEY. \
Create a key at https://aistudio.google.com/app/apikey; GEMINI_MODEL is optional";

/// Chooses the synchronous-text backend.
///
/// A local endpoint always wins, even when cloud credentials are also
/// present. Otherwise the cloud backend is used and all three of its values
/// are required.
pub fn select_backend(sources: &ProviderSources) -> Result<BackendConfig, BackendError> {
    if let Some(endpoint) = present(&sources.local_endpoint) {
        return Ok(BackendConfig {
            kind: ProviderKind::ChatCompletion,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: None,
            model: present(&sources.local_model)
                .unwrap_or(DEFAULT_LOCAL_MODEL)
                .to_string(),
            api_version: None,
            timeout: LOCAL_TIMEOUT,
        });
    }

    let Some(endpoint) = present(&sources.cloud_endpoint) else {
        return Err(BackendError::Configuration(SETUP_GUIDANCE.to_string()));
    };
    let api_key = present(&sources.cloud_api_key).ok_or_else(|| {
        BackendError::Configuration(
            "AZURE_OPENAI_ENDPOINT is set but AZURE_OPENAI_API_KEY is missing".to_string(),
        )
    })?;
    let model = present(&sources.cloud_model).ok_or_else(|| {
        BackendError::Configuration(
            "AZURE_OPENAI_ENDPOINT is set but AZURE_OPENAI_MODEL is missing".to_string(),
        )
    })?;

    Ok(BackendConfig {
        kind: ProviderKind::Responses,
        endpoint: normalize_cloud_endpoint(endpoint)?,
        api_key: Some(api_key.to_string()),
        model: model.to_string(),
        api_version: Some(
            present(&sources.cloud_api_version)
                .unwrap_or(DEFAULT_CLOUD_API_VERSION)
                .to_string(),
        ),
        timeout: CLOUD_TIMEOUT,
    })
}

/// Builds the media-generation config used only by transcription.
pub fn media_backend_config(
    api_key: Option<&str>,
    model: Option<&str>,
) -> Result<BackendConfig, BackendError> {
    let api_key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| BackendError::Configuration(MEDIA_GUIDANCE.to_string()))?;
    Ok(BackendConfig {
        kind: ProviderKind::MediaGeneration,
        endpoint: MEDIA_BASE_URL.to_string(),
        api_key: Some(api_key.to_string()),
        model: model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MEDIA_MODEL)
            .to_string(),
        api_version: None,
        timeout: MEDIA_TIMEOUT,
    })
}

/// Reduces a pasted endpoint to `scheme://host[:port]`.
///
/// Users often copy a full request URL (with deployment path and query)
/// from the portal; only the origin is kept.
pub fn normalize_cloud_endpoint(endpoint: &str) -> Result<String, BackendError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| {
        BackendError::Configuration(format!("invalid AZURE_OPENAI_ENDPOINT '{trimmed}': {e}"))
    })?;
    if url.host_str().is_none() {
        return Err(BackendError::Configuration(format!(
            "AZURE_OPENAI_ENDPOINT '{trimmed}' has no host"
        )));
    }
    Ok(url.origin().ascii_serialization())
}

/// Selects a backend and builds its client in one step.
///
/// Logs which backend was chosen.
pub fn create_text_backend(
    sources: &ProviderSources,
    diagnostics: Arc<dyn Diagnostics>,
) -> Result<(BackendConfig, LlmClient), BackendError> {
    let config = select_backend(sources)?;
    log::info!(
        "Using {} backend at {} (model {})",
        config.kind,
        config.endpoint,
        config.model
    );
    let client = LlmClient::from_config(&config, diagnostics)?;
    Ok((config, client))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
