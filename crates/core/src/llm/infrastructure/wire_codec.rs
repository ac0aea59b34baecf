//! Request and response shapes for the three backend protocols, plus the
//! logic that pulls plain text out of each response envelope.

use serde::{Deserialize, Serialize};

use crate::llm::domain::backend_error::BackendError;

// ── Shared ──────────────────────────────────────────────────────────

/// Error object any of the backends may embed in a decoded body.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    /// String for OpenAI-style backends, integer for Gemini.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorBody {
    pub fn into_error(self) -> BackendError {
        let code = match self.code {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => {
                self.status.clone().unwrap_or_else(|| "unknown".to_string())
            }
            Some(other) => other.to_string(),
        };
        BackendError::Application {
            code,
            message: self
                .message
                .unwrap_or_else(|| "no message provided".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleMessage {
    pub role: &'static str,
    pub content: String,
}

fn system_then_user(system_instruction: &str, user_text: &str) -> Vec<RoleMessage> {
    vec![
        RoleMessage {
            role: "system",
            content: system_instruction.to_string(),
        },
        RoleMessage {
            role: "user",
            content: user_text.to_string(),
        },
    ]
}

fn non_empty(text: String, what: &str) -> Result<String, BackendError> {
    if text.trim().is_empty() {
        Err(BackendError::missing(what))
    } else {
        Ok(text)
    }
}

// ── Chat completion ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<RoleMessage>,
}

impl ChatRequest {
    pub fn new(model: &str, system_instruction: &str, user_text: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: system_then_user(system_instruction, user_text),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Text of the first choice's message.
pub fn extract_chat_text(response: ChatResponse) -> Result<String, BackendError> {
    if let Some(error) = response.error {
        return Err(error.into_error());
    }
    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::missing("choices"))?
        .message
        .content
        .unwrap_or_default();
    non_empty(content, "message content")
}

// ── Responses ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<RoleMessage>,
}

impl ResponsesRequest {
    pub fn new(model: &str, system_instruction: &str, user_text: &str) -> Self {
        Self {
            model: model.to_string(),
            input: system_then_user(system_instruction, user_text),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Text of the first `message` output item.
///
/// Reasoning and tool-call items that precede the message are skipped. Only
/// `output_text` and `text` entries contribute; refusals and other entry
/// types are ignored.
pub fn extract_responses_text(response: ResponsesResponse) -> Result<String, BackendError> {
    if let Some(error) = response.error {
        return Err(error.into_error());
    }
    let message = response
        .output
        .into_iter()
        .find(|item| item.kind == "message")
        .ok_or_else(|| BackendError::missing("message output item"))?;
    let text: String = message
        .content
        .into_iter()
        .filter(|entry| entry.kind == "output_text" || entry.kind == "text")
        .filter_map(|entry| entry.text)
        .collect();
    non_empty(text, "output text")
}

// ── Media generation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadStartRequest {
    pub file: UploadStartFile,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadStartFile {
    pub display_name: String,
}

impl UploadStartRequest {
    pub fn new(display_name: &str) -> Self {
        Self {
            file: UploadStartFile {
                display_name: display_name.to_string(),
            },
        }
    }
}

/// Body returned when an upload is finalized.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFileEnvelope {
    pub file: FileResource,
}

/// Remote file metadata as reported by the upload and status endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RequestPart {
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl GenerateContentRequest {
    /// One content block: the file reference followed by the prompt.
    pub fn for_file(file_uri: &str, mime_type: &str, prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::File {
                        file_data: FileData {
                            mime_type: mime_type.to_string(),
                            file_uri: file_uri.to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Text of the first candidate's first content part.
pub fn extract_generated_text(response: GenerateContentResponse) -> Result<String, BackendError> {
    if let Some(error) = response.error {
        return Err(error.into_error());
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::missing("candidates"))?;
    let part = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .ok_or_else(|| BackendError::missing("content parts"))?;
    non_empty(part.text.unwrap_or_default(), "generated text")
}

// ── Model output cleanup ────────────────────────────────────────────

/// Strips an optional markdown code fence and surrounding whitespace.
///
/// Handles a leading "```json" or bare "```" and a trailing "```". Text
/// without a fence only loses its surrounding whitespace, so cleaning is
/// idempotent.
pub fn strip_code_fence(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}
