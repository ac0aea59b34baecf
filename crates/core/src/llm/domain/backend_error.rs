use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Coarse class of a [`BackendError`], used by callers to decide whether to
/// retry, re-prompt the user, or abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Protocol,
    Application,
    Semantic,
    Timeout,
    Cancellation,
}

/// Every failure a backend exchange or workflow can surface.
///
/// URLs stored here never carry credentials: query-string keys are added to
/// requests separately and transport errors are stripped of their URL.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    Configuration(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("malformed response from {url}: {reason}\nraw response: {body}")]
    MalformedResponse {
        url: String,
        reason: String,
        body: String,
    },

    #[error("backend error {code}: {message}")]
    Application { code: String, message: String },

    #[error("backend response contained no {what}")]
    MissingContent { what: String },

    #[error("{0}")]
    Semantic(String),

    #[error("remote processing of file {name} failed: {reason}")]
    FileProcessingFailed { name: String, reason: String },

    #[error("file was not ready after waiting {waited:?}")]
    Timeout { waited: Duration },

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Configuration(_) | BackendError::Io { .. } => ErrorKind::Configuration,
            BackendError::Transport { .. } => ErrorKind::Transport,
            BackendError::Status { .. }
            | BackendError::MalformedResponse { .. }
            | BackendError::MissingContent { .. } => ErrorKind::Protocol,
            BackendError::Application { .. } => ErrorKind::Application,
            BackendError::Semantic(_) | BackendError::FileProcessingFailed { .. } => {
                ErrorKind::Semantic
            }
            BackendError::Timeout { .. } => ErrorKind::Timeout,
            BackendError::Cancelled => ErrorKind::Cancellation,
        }
    }

    pub(crate) fn missing(what: &str) -> Self {
        BackendError::MissingContent {
            what: what.to_string(),
        }
    }
}
