use std::path::PathBuf;

use crate::llm::domain::backend_error::BackendError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::poll_clock::{PollClock, PollPolicy, SystemClock};
use crate::transcription::domain::content_type::infer_video_content_type;
use crate::transcription::domain::media_backend::MediaBackend;
use crate::transcription::domain::remote_file::{FileState, RemoteFileHandle};
use crate::transcription::domain::transcript::TranscriptResult;

/// Progress callback receiving a short phase label.
pub type ProgressFn = Box<dyn Fn(&str) + Send>;

pub const PHASE_UPLOADING: &str = "Uploading video";
pub const PHASE_PROCESSING: &str = "Waiting for video processing";
pub const PHASE_GENERATING: &str = "Generating transcript";

const REPORTED_FAILED: &str = "backend reported state FAILED";

const TRANSCRIPTION_PROMPT: &str = "Transcribe all spoken content in this video as plain text. \
Start a new line with a speaker marker such as \"Speaker 1:\" whenever the speaker changes. \
Insert timestamps in [MM:SS] format at natural breaks in the speech. \
Output only the transcript, without commentary or markdown formatting.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptionRequest {
    pub path: PathBuf,
    /// Spoken language hint, e.g. `en` or `German`.
    pub language: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }
}

/// Obtains a transcript for a local video file.
///
/// Phases run strictly in order: upload, poll until the backend reports the
/// file ready, then generate. Nothing is retried; a failure in any phase is
/// terminal and the uploaded file is left for the backend to expire.
pub struct TranscribeVideoUseCase {
    backend: Box<dyn MediaBackend>,
    clock: Box<dyn PollClock>,
    policy: PollPolicy,
    on_progress: Option<ProgressFn>,
}

impl TranscribeVideoUseCase {
    pub fn new(backend: Box<dyn MediaBackend>, on_progress: Option<ProgressFn>) -> Self {
        Self {
            backend,
            clock: Box::new(SystemClock),
            policy: PollPolicy::default(),
            on_progress,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn execute(
        &self,
        request: &TranscriptionRequest,
        cancel: &CancellationToken,
    ) -> Result<TranscriptResult, BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        let path = request.path.as_path();
        std::fs::metadata(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mime_type = infer_video_content_type(path);

        // 1. Upload
        self.report(PHASE_UPLOADING);
        log::info!("Uploading {} as {mime_type}", path.display());
        let mut file = self.backend.upload(path, &mime_type, cancel)?;
        if file.state == FileState::Failed {
            return Err(BackendError::FileProcessingFailed {
                name: file.name,
                reason: REPORTED_FAILED.to_string(),
            });
        }
        file.state = FileState::Processing;

        // 2. Wait for processing
        self.report(PHASE_PROCESSING);
        let polls = self.wait_until_ready(&mut file, cancel)?;
        log::info!("{} ready after {polls} status checks", file.name);

        // 3. Generate
        self.report(PHASE_GENERATING);
        let prompt = transcription_prompt(request.language.as_deref());
        let text = self.backend.generate(&file, &prompt, cancel)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::MissingContent {
                what: "transcript text".to_string(),
            });
        }

        Ok(TranscriptResult {
            text: text.to_string(),
            language: request.language.clone(),
        })
    }

    /// Polls on every tick until the file is ready.
    ///
    /// Waits on cancellation, the overall deadline and the next tick at once.
    /// When several are ready, cancellation wins over timeout and timeout
    /// over polling. A failed status request is logged and retried on the
    /// next tick, unless it reports the file itself as failed. Returns the number of status requests made.
    fn wait_until_ready(
        &self,
        file: &mut RemoteFileHandle,
        cancel: &CancellationToken,
    ) -> Result<usize, BackendError> {
        let ticks = self.clock.ticks(self.policy.interval);
        let deadline = self.clock.deadline(self.policy.timeout);
        let timed_out = || BackendError::Timeout {
            waited: self.policy.timeout,
        };
        let mut polls = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
            if deadline.try_recv().is_ok() {
                return Err(timed_out());
            }

            crossbeam_channel::select! {
                recv(cancel.signal()) -> _ => return Err(BackendError::Cancelled),
                recv(deadline) -> _ => return Err(timed_out()),
                recv(ticks) -> tick => {
                    if tick.is_err() {
                        return Err(BackendError::Configuration(
                            "poll clock stopped delivering ticks".to_string(),
                        ));
                    }
                }
            }

            polls += 1;
            match self.backend.file_state(file, cancel) {
                Ok(FileState::Ready) => {
                    file.state = FileState::Ready;
                    return Ok(polls);
                }
                Ok(FileState::Failed) => {
                    file.state = FileState::Failed;
                    return Err(BackendError::FileProcessingFailed {
                        name: file.name.clone(),
                        reason: REPORTED_FAILED.to_string(),
                    });
                }
                Ok(state) => log::debug!("{} still {state:?} (poll {polls})", file.name),
                Err(e @ (BackendError::Cancelled | BackendError::FileProcessingFailed { .. })) => {
                    return Err(e)
                }
                Err(e) => log::warn!("Status check {polls} for {} failed: {e}", file.name),
            }
        }
    }

    fn report(&self, phase: &str) {
        if let Some(ref cb) = self.on_progress {
            cb(phase);
        }
    }
}

/// Fixed transcription prompt, with an optional language hint appended.
pub fn transcription_prompt(language: Option<&str>) -> String {
    match language {
        Some(lang) => format!(
            "{TRANSCRIPTION_PROMPT} The spoken language is {lang}; write the transcript in that language."
        ),
        None => TRANSCRIPTION_PROMPT.to_string(),
    }
}
