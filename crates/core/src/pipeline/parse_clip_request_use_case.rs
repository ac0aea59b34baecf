use serde::Deserialize;

use crate::clip::domain::clip_time_range::ClipTimeRange;
use crate::llm::domain::backend_error::BackendError;
use crate::llm::domain::text_backend::TextBackend;
use crate::llm::infrastructure::wire_codec::strip_code_fence;
use crate::shared::cancellation::CancellationToken;
use crate::shared::timecode::{format_hms, parse_hms};

/// Turns a free-text clip request ("first 3 minutes", "last 30 seconds")
/// into a [`ClipTimeRange`] by asking a text backend.
///
/// By default the model's timestamps are returned as-is once they decode;
/// nothing checks them against the rules stated in the prompt. Enable
/// [`with_strict_bounds`](Self::with_strict_bounds) to reject malformed or
/// out-of-range answers.
pub struct ParseClipRequestUseCase {
    backend: Box<dyn TextBackend>,
    strict_bounds: bool,
}

impl ParseClipRequestUseCase {
    pub fn new(backend: Box<dyn TextBackend>) -> Self {
        Self {
            backend,
            strict_bounds: false,
        }
    }

    pub fn with_strict_bounds(mut self, strict: bool) -> Self {
        self.strict_bounds = strict;
        self
    }

    pub fn execute(
        &self,
        request: &str,
        video_duration_secs: f64,
        cancel: &CancellationToken,
    ) -> Result<ClipTimeRange, BackendError> {
        let instruction = build_system_instruction(video_duration_secs);
        let raw = self.backend.ask_text(&instruction, request, cancel)?;
        let range = decode_clip_range(&raw)?;
        if self.strict_bounds {
            check_bounds(&range, video_duration_secs)?;
        }
        Ok(range)
    }
}

/// System prompt stating the video length, output format and the rules the
/// model must follow.
pub fn build_system_instruction(video_duration_secs: f64) -> String {
    let total = format_hms(video_duration_secs);
    format!(
        "You convert a viewer's description of a video segment into start and end timestamps.\n\
         The video is {total} long (HH:MM:SS).\n\
         Respond with only a JSON object of the form \
         {{\"start_time\":\"HH:MM:SS\",\"end_time\":\"HH:MM:SS\"}} using two-digit minutes and seconds.\n\
         Rules:\n\
         1. \"First N\" (seconds, minutes, hours) starts at 00:00:00 and ends N later.\n\
         2. \"Last N\" ends at {total} and starts N earlier.\n\
         3. A duration from a start point (\"2 minutes from 1:30\", \"30 seconds starting at 5:00\") \
         starts at that point and ends that duration later.\n\
         4. end_time must never exceed {total}.\n\
         5. If the request cannot be understood, do not guess: respond with \
         {{\"start_time\":\"\",\"end_time\":\"\",\"error\":\"<short explanation>\"}}."
    )
}

#[derive(Deserialize)]
struct RawClipRange {
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes model output into a range.
///
/// Markdown fences are stripped first. A non-empty `error` field always wins
/// over any timestamps that are also present.
pub fn decode_clip_range(raw: &str) -> Result<ClipTimeRange, BackendError> {
    let malformed = |reason: String| BackendError::MalformedResponse {
        url: "model output".to_string(),
        reason,
        body: raw.to_string(),
    };

    let decoded: RawClipRange =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| malformed(e.to_string()))?;

    if let Some(error) = decoded.error.filter(|e| !e.trim().is_empty()) {
        return Err(BackendError::Semantic(error));
    }

    match (decoded.start_time, decoded.end_time) {
        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
            Ok(ClipTimeRange::new(start, end))
        }
        _ => Err(malformed(
            "start_time and end_time are required when no error is given".to_string(),
        )),
    }
}

fn check_bounds(range: &ClipTimeRange, video_duration_secs: f64) -> Result<(), BackendError> {
    let parse = |value: &str| {
        parse_hms(value).ok_or_else(|| {
            BackendError::Semantic(format!("model returned malformed timestamp '{value}'"))
        })
    };
    let start = parse(&range.start_time)?;
    let end = parse(&range.end_time)?;
    if end <= start {
        return Err(BackendError::Semantic(format!(
            "end time {} is not after start time {}",
            range.end_time, range.start_time
        )));
    }
    let limit = if video_duration_secs.is_finite() && video_duration_secs > 0.0 {
        video_duration_secs.floor() as u64
    } else {
        0
    };
    if end > limit {
        return Err(BackendError::Semantic(format!(
            "end time {} exceeds video duration {}",
            range.end_time,
            format_hms(video_duration_secs)
        )));
    }
    Ok(())
}
