use std::time::Duration;

use crate::shared::diagnostics::redact_secret;

/// The three wire protocols a backend can speak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-compatible `/v1/chat/completions`, used for self-hosted servers.
    ChatCompletion,
    /// Azure OpenAI "responses" API.
    Responses,
    /// Upload, poll, then `generateContent` against a media-capable model.
    MediaGeneration,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::ChatCompletion => write!(f, "chat-completion"),
            ProviderKind::Responses => write!(f, "responses"),
            ProviderKind::MediaGeneration => write!(f, "media-generation"),
        }
    }
}

/// Immutable description of the backend chosen at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub kind: ProviderKind,
    /// Base endpoint without trailing slash.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub api_version: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_deref().map(redact_secret))
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_api_key() {
        let config = BackendConfig {
            kind: ProviderKind::Responses,
            endpoint: "https://myres.openai.azure.com".to_string(),
            api_key: Some("0123456789abcdef0123".to_string()),
            model: "gpt-4o".to_string(),
            api_version: Some("2025-04-01-preview".to_string()),
            timeout: Duration::from_secs(60),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("0123456789abcdef0123"));
        assert!(debug.contains("0123...0123"));
        assert!(debug.contains("gpt-4o"));
    }
}
