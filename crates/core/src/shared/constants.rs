use std::time::Duration;

/// Model name sent to a self-hosted server when none is configured.
pub const DEFAULT_LOCAL_MODEL: &str = "local-model";

pub const DEFAULT_CLOUD_API_VERSION: &str = "2025-04-01-preview";

pub const DEFAULT_MEDIA_MODEL: &str = "gemini-2.5-flash";
pub const MEDIA_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const CLOUD_TIMEOUT: Duration = Duration::from_secs(60);
pub const LOCAL_TIMEOUT: Duration = Duration::from_secs(300);
/// Bounds a single exchange, including the upload of a large video.
pub const MEDIA_TIMEOUT: Duration = Duration::from_secs(600);

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Longest response-body excerpt carried in errors and diagnostics.
pub const BODY_EXCERPT_CHARS: usize = 512;

/// Container extensions mapped when the MIME database has no entry.
pub const VIDEO_MIME_FALLBACKS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("flv", "video/x-flv"),
    ("wmv", "video/x-ms-wmv"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("3gp", "video/3gpp"),
];

pub const GENERIC_VIDEO_MIME: &str = "video/mp4";
