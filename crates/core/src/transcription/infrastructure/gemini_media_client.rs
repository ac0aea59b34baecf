use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use reqwest::blocking::{Body, Client};
use reqwest::header::CONTENT_TYPE;

use crate::llm::domain::backend_config::{BackendConfig, ProviderKind};
use crate::llm::domain::backend_error::BackendError;
use crate::llm::infrastructure::http_exchange::{build_client, encode_json, read_json, send};
use crate::llm::infrastructure::wire_codec::{
    extract_generated_text, FileResource, GenerateContentRequest, GenerateContentResponse,
    UploadStartRequest, UploadedFileEnvelope,
};
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::BODY_EXCERPT_CHARS;
use crate::shared::diagnostics::{excerpt, redact_secret, Diagnostics};
use crate::transcription::domain::media_backend::MediaBackend;
use crate::transcription::domain::remote_file::{FileState, RemoteFileHandle};

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for the Gemini file API and `generateContent`.
///
/// The API key travels as a `key` query parameter. It is added through
/// `RequestBuilder::query` so the URLs kept for errors and diagnostics never
/// contain it.
pub struct GeminiMediaClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    diagnostics: Arc<dyn Diagnostics>,
}

impl GeminiMediaClient {
    pub fn new(
        config: &BackendConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BackendError> {
        if config.kind != ProviderKind::MediaGeneration {
            return Err(BackendError::Configuration(format!(
                "{} config cannot drive the media backend",
                config.kind
            )));
        }
        let api_key = config.api_key.clone().ok_or_else(|| {
            BackendError::Configuration("media backend requires an API key".to_string())
        })?;
        diagnostics.info(&format!(
            "media backend {} model={} key={}",
            config.endpoint,
            config.model,
            redact_secret(&api_key)
        ));
        Ok(Self {
            http: build_client(config.timeout)?,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            diagnostics,
        })
    }

    /// Step one of the resumable upload: announces size and type and returns
    /// the target URL handed back in the `X-Goog-Upload-URL` header.
    pub fn start_upload(
        &self,
        display_name: &str,
        size: u64,
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError> {
        let url = format!("{}/upload/v1beta/files", self.base_url);
        let body = encode_json(&UploadStartRequest::new(display_name))?;
        let request = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone());

        let response = send(
            request,
            "POST",
            &url,
            Some(&body),
            self.diagnostics.as_ref(),
            cancel,
        )?;
        let target = response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let status = response.status().as_u16();
        let text = response.text().unwrap_or_default();
        self.diagnostics.response(&url, status, &text);

        target.ok_or_else(|| BackendError::MalformedResponse {
            url,
            reason: format!("missing {UPLOAD_URL_HEADER} header"),
            body: excerpt(&text, BODY_EXCERPT_CHARS),
        })
    }

    /// Step two: streams the file to the upload target and finalizes it.
    pub fn upload_content(
        &self,
        upload_url: &str,
        path: &Path,
        size: u64,
        fallback_mime: &str,
        cancel: &CancellationToken,
    ) -> Result<RemoteFileHandle, BackendError> {
        let file = File::open(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let display_url = without_query(upload_url);
        let request = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(Body::sized(file, size));

        let response = send(
            request,
            "POST",
            display_url,
            None,
            self.diagnostics.as_ref(),
            cancel,
        )?;
        let envelope: UploadedFileEnvelope =
            read_json(response, display_url, self.diagnostics.as_ref())?;
        to_handle(envelope.file, fallback_mime)
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.base_url, name)
    }
}

impl MediaBackend for GeminiMediaClient {
    fn upload(
        &self,
        path: &Path,
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> Result<RemoteFileHandle, BackendError> {
        let size = std::fs::metadata(path)
            .map_err(|source| BackendError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video");

        let target = self.start_upload(display_name, size, mime_type, cancel)?;
        self.upload_content(&target, path, size, mime_type, cancel)
    }

    fn file_state(
        &self,
        file: &RemoteFileHandle,
        cancel: &CancellationToken,
    ) -> Result<FileState, BackendError> {
        let url = self.file_url(&file.name);
        let request = self.http.get(&url).query(&[("key", self.api_key.as_str())]);
        let response = send(request, "GET", &url, None, self.diagnostics.as_ref(), cancel)?;
        let resource: FileResource = read_json(response, &url, self.diagnostics.as_ref())?;
        let state = remote_state(&resource)?;
        if let Some(error) = resource.error {
            return Err(error.into_error());
        }
        Ok(state)
    }

    fn generate(
        &self,
        file: &RemoteFileHandle,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = encode_json(&GenerateContentRequest::for_file(
            &file.uri,
            &file.mime_type,
            prompt,
        ))?;
        let request = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(body.clone());

        let response = send(
            request,
            "POST",
            &url,
            Some(&body),
            self.diagnostics.as_ref(),
            cancel,
        )?;
        let decoded: GenerateContentResponse =
            read_json(response, &url, self.diagnostics.as_ref())?;
        extract_generated_text(decoded)
    }
}

/// Maps the reported state. A `FAILED` file is an error even when the body
/// also carries an error object; the object's message becomes the reason.
fn remote_state(file: &FileResource) -> Result<FileState, BackendError> {
    let state = FileState::from_remote(file.state.as_deref().unwrap_or(""));
    if state == FileState::Failed {
        let reason = file
            .error
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| "backend reported state FAILED".to_string());
        return Err(BackendError::FileProcessingFailed {
            name: file.name.clone(),
            reason,
        });
    }
    Ok(state)
}

fn to_handle(file: FileResource, fallback_mime: &str) -> Result<RemoteFileHandle, BackendError> {
    let state = remote_state(&file)?;
    if let Some(error) = file.error {
        return Err(error.into_error());
    }
    if file.uri.is_empty() {
        return Err(BackendError::MissingContent {
            what: "file uri".to_string(),
        });
    }
    Ok(RemoteFileHandle {
        name: file.name,
        uri: file.uri,
        mime_type: file
            .mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_mime.to_string()),
        state,
    })
}

/// Upload targets embed session tokens in their query string.
fn without_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::domain::backend_error::ErrorKind;
    use crate::pipeline::transcribe_video_use_case::{TranscribeVideoUseCase, TranscriptionRequest};
    use crate::shared::diagnostics::{NullDiagnostics, RecordingDiagnostics};
    use crate::shared::poll_clock::PollPolicy;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const KEY: &str = "AIzaSy-test-key-0123456789";

    fn client(base_url: &str) -> GeminiMediaClient {
        client_with(base_url, Arc::new(NullDiagnostics))
    }

    fn client_with(base_url: &str, diagnostics: Arc<dyn Diagnostics>) -> GeminiMediaClient {
        let config = BackendConfig {
            kind: ProviderKind::MediaGeneration,
            endpoint: base_url.to_string(),
            api_key: Some(KEY.to_string()),
            model: "gemini-2.5-flash".to_string(),
            api_version: None,
            timeout: Duration::from_secs(5),
        };
        GeminiMediaClient::new(&config, diagnostics).unwrap()
    }

    fn handle() -> RemoteFileHandle {
        RemoteFileHandle {
            name: "files/abc-123".to_string(),
            uri: "https://generativelanguage.googleapis.com/v1beta/files/abc-123".to_string(),
            mime_type: "video/mp4".to_string(),
            state: FileState::Processing,
        }
    }

    fn video_fixture(bytes: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_rejects_non_media_config() {
        let config = BackendConfig {
            kind: ProviderKind::Responses,
            endpoint: "https://x".to_string(),
            api_key: Some(KEY.to_string()),
            model: "m".to_string(),
            api_version: None,
            timeout: Duration::from_secs(5),
        };
        assert!(GeminiMediaClient::new(&config, Arc::new(NullDiagnostics)).is_err());
    }

    #[test]
    fn test_upload_hands_off_through_header() {
        let mut server = mockito::Server::new();
        let base = server.url();
        let video = video_fixture(b"fake video bytes");

        let init = server
            .mock("POST", "/upload/v1beta/files")
            .match_query(Matcher::UrlEncoded("key".into(), KEY.into()))
            .match_header("x-goog-upload-protocol", "resumable")
            .match_header("x-goog-upload-command", "start")
            .match_header("x-goog-upload-header-content-length", "16")
            .match_header("x-goog-upload-header-content-type", "video/mp4")
            .match_body(Matcher::PartialJson(json!({"file": {}})))
            .with_status(200)
            .with_header(
                "x-goog-upload-url",
                &format!("{base}/upload-target?upload_id=xyz"),
            )
            .create();
        let content = server
            .mock("POST", "/upload-target")
            .match_query(Matcher::UrlEncoded("upload_id".into(), "xyz".into()))
            .match_header("x-goog-upload-offset", "0")
            .match_header("x-goog-upload-command", "upload, finalize")
            .match_body("fake video bytes")
            .with_status(200)
            .with_body(
                json!({"file": {
                    "name": "files/abc-123",
                    "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc-123",
                    "mimeType": "video/mp4",
                    "state": "PROCESSING"
                }})
                .to_string(),
            )
            .create();

        let file = client(&base)
            .upload(video.path(), "video/mp4", &CancellationToken::new())
            .unwrap();

        init.assert();
        content.assert();
        assert_eq!(file, handle());
    }

    #[test]
    fn test_missing_upload_header_is_malformed() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/upload/v1beta/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create();

        let err = client(&server.url())
            .start_upload("a.mp4", 10, "video/mp4", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse { .. }));
    }

    #[test]
    fn test_missing_upload_header_truncates_body() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/upload/v1beta/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("x".repeat(10_000))
            .create();

        let err = client(&server.url())
            .start_upload("a.mp4", 10, "video/mp4", &CancellationToken::new())
            .unwrap_err();
        match err {
            BackendError::MalformedResponse { body, .. } => {
                assert!(body.ends_with("[truncated]"));
                assert!(body.chars().count() < BODY_EXCERPT_CHARS + 32);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_init_failure_does_not_attempt_content_upload() {
        let mut server = mockito::Server::new();
        let video = video_fixture(b"x");
        let _init = server
            .mock("POST", "/upload/v1beta/files")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"API key not valid"}}"#)
            .create();
        let content = server
            .mock("POST", Matcher::Regex("^/upload-target".to_string()))
            .expect(0)
            .create();

        let err = client(&server.url())
            .upload(video.path(), "video/mp4", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 403, .. }));
        assert!(err.to_string().contains("API key not valid"));
        content.assert();
    }

    #[test]
    fn test_upload_missing_file_is_io_error() {
        let err = client("http://127.0.0.1:9")
            .upload(
                Path::new("/nonexistent/video.mp4"),
                "video/mp4",
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, BackendError::Io { .. }));
    }

    #[test]
    fn test_file_state_maps_remote_state() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/v1beta/files/abc-123")
            .match_query(Matcher::UrlEncoded("key".into(), KEY.into()))
            .with_status(200)
            .with_body(r#"{"name":"files/abc-123","uri":"u","state":"ACTIVE"}"#)
            .create();

        let state = client(&server.url())
            .file_state(&handle(), &CancellationToken::new())
            .unwrap();
        assert_eq!(state, FileState::Ready);
    }

    #[test]
    fn test_failed_state_with_error_object_is_processing_failure() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/v1beta/files/abc-123")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"name":"files/abc-123","state":"FAILED","error":{"code":13,"message":"video processing failed"}}"#,
            )
            .create();

        let err = client(&server.url())
            .file_state(&handle(), &CancellationToken::new())
            .unwrap_err();
        match err {
            BackendError::FileProcessingFailed { name, reason } => {
                assert_eq!(name, "files/abc-123");
                assert_eq!(reason, "video processing failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_state_without_error_object_is_processing_failure() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/v1beta/files/abc-123")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"name":"files/abc-123","state":"FAILED"}"#)
            .create();

        let err = client(&server.url())
            .file_state(&handle(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, BackendError::FileProcessingFailed { .. }));
    }

    #[test]
    fn test_failed_processing_ends_transcription_without_waiting_for_timeout() {
        let mut server = mockito::Server::new();
        let base = server.url();
        let video = video_fixture(b"fake video bytes");
        let _init = server
            .mock("POST", "/upload/v1beta/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("x-goog-upload-url", &format!("{base}/upload-target"))
            .create();
        let _content = server
            .mock("POST", "/upload-target")
            .with_status(200)
            .with_body(
                json!({"file": {
                    "name": "files/abc",
                    "uri": format!("{base}/v1beta/files/abc"),
                    "mimeType": "video/mp4",
                    "state": "PROCESSING"
                }})
                .to_string(),
            )
            .create();
        let status = server
            .mock("GET", "/v1beta/files/abc")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"name":"files/abc","state":"FAILED","error":{"code":13,"message":"video processing failed"}}"#,
            )
            .expect(1)
            .create();
        let generate = server
            .mock("POST", Matcher::Regex(":generateContent".to_string()))
            .expect(0)
            .create();

        let err = TranscribeVideoUseCase::new(Box::new(client(&base)), None)
            .with_policy(PollPolicy {
                interval: Duration::from_millis(10),
                timeout: Duration::from_secs(30),
            })
            .execute(
                &TranscriptionRequest::new(video.path()),
                &CancellationToken::new(),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(err.to_string().contains("video processing failed"));
        status.assert();
        generate.assert();
    }

    #[test]
    fn test_upload_reporting_failed_is_processing_failure() {
        let file = FileResource {
            name: "files/abc".to_string(),
            uri: "u".to_string(),
            mime_type: None,
            state: Some("FAILED".to_string()),
            error: None,
        };
        let err = to_handle(file, "video/mp4").unwrap_err();
        assert!(matches!(err, BackendError::FileProcessingFailed { .. }));
    }

    #[test]
    fn test_generate_sends_file_reference_and_prompt() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), KEY.into()))
            .match_body(Matcher::Json(json!({
                "contents": [{"parts": [
                    {"fileData": {
                        "mimeType": "video/mp4",
                        "fileUri": "https://generativelanguage.googleapis.com/v1beta/files/abc-123"
                    }},
                    {"text": "transcribe please"}
                ]}]
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"[00:00] Hi"}]}}]}"#)
            .create();

        let text = client(&server.url())
            .generate(&handle(), "transcribe please", &CancellationToken::new())
            .unwrap();
        assert_eq!(text, "[00:00] Hi");
        mock.assert();
    }

    #[test]
    fn test_generate_without_candidates_is_protocol_error() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create();

        let err = client(&server.url())
            .generate(&handle(), "p", &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_errors_and_diagnostics_never_contain_key() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/v1beta/files/abc-123")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("internal")
            .create();
        let diagnostics = Arc::new(RecordingDiagnostics::new());

        let err = client_with(&server.url(), diagnostics.clone())
            .file_state(&handle(), &CancellationToken::new())
            .unwrap_err();
        assert!(!err.to_string().contains(KEY));
        assert!(diagnostics.events().iter().all(|e| !e.contains(KEY)));
    }

    #[test]
    fn test_without_query() {
        assert_eq!(without_query("https://h/upload?upload_id=1"), "https://h/upload");
        assert_eq!(without_query("https://h/upload"), "https://h/upload");
    }
}
