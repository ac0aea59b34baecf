use std::path::Path;

/// Reports the playable length of a media file.
///
/// Implementations handle container details; callers only need seconds.
pub trait DurationProbe: Send {
    /// Returns the duration of the file in seconds. Must be positive.
    fn duration_secs(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>>;
}
