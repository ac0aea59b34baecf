use std::path::Path;

use crate::shared::constants::{GENERIC_VIDEO_MIME, VIDEO_MIME_FALLBACKS};

/// Content type declared when uploading a video. Never empty.
///
/// Checks the MIME database first, then a table of common video containers,
/// and finally falls back to a generic video type.
pub fn infer_video_content_type(path: &Path) -> String {
    if let Some(mime) = mime_guess::from_path(path).first() {
        return mime.essence_str().to_string();
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    VIDEO_MIME_FALLBACKS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| (*mime).to_string())
        .unwrap_or_else(|| GENERIC_VIDEO_MIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::mp4("talk.mp4", "video/mp4")]
    #[case::upper_case("TALK.MP4", "video/mp4")]
    #[case::mov("clip.mov", "video/quicktime")]
    #[case::webm("clip.webm", "video/webm")]
    #[case::no_extension("recording", GENERIC_VIDEO_MIME)]
    #[case::unknown_extension("recording.zzvid", GENERIC_VIDEO_MIME)]
    fn test_infer_video_content_type(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(infer_video_content_type(Path::new(path)), expected);
    }

    #[test]
    fn test_matroska_resolves_to_a_video_type() {
        let mime = infer_video_content_type(Path::new("movie.mkv"));
        assert!(mime.starts_with("video/"), "got {mime}");
    }

    #[test]
    fn test_never_empty() {
        for name in ["a.avi", "a.flv", "a.3gp", "a.", ".hidden", "a.mpg"] {
            assert!(!infer_video_content_type(Path::new(name)).is_empty());
        }
    }
}
