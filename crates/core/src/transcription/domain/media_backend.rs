use std::path::Path;

use crate::llm::domain::backend_error::BackendError;
use crate::shared::cancellation::CancellationToken;

use super::remote_file::{FileState, RemoteFileHandle};

/// Domain interface for a backend that generates text from an uploaded
/// media file.
///
/// Each method is one step of the transcription workflow and performs no
/// retries of its own.
pub trait MediaBackend: Send + Sync {
    /// Uploads the whole file and returns a handle in its post-upload state.
    fn upload(
        &self,
        path: &Path,
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> Result<RemoteFileHandle, BackendError>;

    /// Queries the current processing state of an uploaded file.
    ///
    /// A failed file is reported either as `Ok(FileState::Failed)` or as
    /// `BackendError::FileProcessingFailed` carrying the backend's reason.
    fn file_state(
        &self,
        file: &RemoteFileHandle,
        cancel: &CancellationToken,
    ) -> Result<FileState, BackendError>;

    /// Runs `prompt` against a ready file and returns the generated text.
    fn generate(
        &self,
        file: &RemoteFileHandle,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError>;
}
