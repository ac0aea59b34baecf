//! One request/response exchange with status, decoding and cancellation
//! handling shared by every backend client.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::llm::domain::backend_error::BackendError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::BODY_EXCERPT_CHARS;
use crate::shared::diagnostics::{excerpt, Diagnostics};

pub(crate) fn build_client(timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Configuration(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn encode_json<T: Serialize>(payload: &T) -> Result<String, BackendError> {
    serde_json::to_string(payload)
        .map_err(|e| BackendError::Configuration(format!("failed to encode request body: {e}")))
}

/// Sends `request` and fails on any non-2xx status.
///
/// `url` is the credential-free form used for errors and diagnostics. The
/// token is checked before sending and again once the response arrives; an
/// exchange already in flight is bounded by the client timeout.
pub(crate) fn send(
    request: RequestBuilder,
    method: &str,
    url: &str,
    body: Option<&str>,
    diagnostics: &dyn Diagnostics,
    cancel: &CancellationToken,
) -> Result<Response, BackendError> {
    if cancel.is_cancelled() {
        return Err(BackendError::Cancelled);
    }
    diagnostics.request(method, url, body);

    let response = request.send().map_err(|e| transport(url, e))?;
    if cancel.is_cancelled() {
        return Err(BackendError::Cancelled);
    }

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        diagnostics.response(url, status.as_u16(), &body);
        return Err(BackendError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body: excerpt(&body, BODY_EXCERPT_CHARS),
        });
    }
    Ok(response)
}

/// Reads the whole body and decodes it as `T`.
pub(crate) fn read_json<T: DeserializeOwned>(
    response: Response,
    url: &str,
    diagnostics: &dyn Diagnostics,
) -> Result<T, BackendError> {
    let status = response.status().as_u16();
    let body = response.text().map_err(|e| transport(url, e))?;
    diagnostics.response(url, status, &body);
    serde_json::from_str(&body).map_err(|e| BackendError::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
        body: excerpt(&body, BODY_EXCERPT_CHARS),
    })
}

fn transport(url: &str, error: reqwest::Error) -> BackendError {
    BackendError::Transport {
        url: url.to_string(),
        source: error.without_url(),
    }
}
