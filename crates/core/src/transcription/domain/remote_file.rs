/// Lifecycle of a file uploaded to the media backend.
///
/// `Uploading → Processing → Ready | Failed`. Transitions after the upload
/// are driven only by polling the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileState {
    Uploading,
    Processing,
    Ready,
    Failed,
}

impl FileState {
    /// Maps the backend's state string. Anything other than `ACTIVE` or
    /// `FAILED` (including unknown values) means "still processing".
    pub fn from_remote(state: &str) -> Self {
        match state {
            "ACTIVE" => FileState::Ready,
            "FAILED" => FileState::Failed,
            _ => FileState::Processing,
        }
    }
}

/// Reference to an uploaded file. No explicit delete is ever issued; the
/// backend expires it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFileHandle {
    /// Resource name used for status lookups, e.g. `files/abc-123`.
    pub name: String,
    /// URI passed to generation requests.
    pub uri: String,
    pub mime_type: String,
    pub state: FileState,
}
